//! Text and JSON presentation of movies.

use serde::Serialize;

use cmdb::{Catalog, KeyValueStore, Movie};

const TITLE_WIDTH: usize = 32;
const GENRES_WIDTH: usize = 28;

/// Placeholder shown for a movie nobody has rated.
pub fn rating_label(rating: Option<i64>) -> String {
    rating.map_or_else(|| "-".to_string(), |r| r.to_string())
}

/// A movie with its genre names resolved, as printed by the CLI.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieView {
    pub id: u64,
    pub title: String,
    pub release_date: String,
    pub popularity: f64,
    pub genre_ids: Vec<u64>,
    pub genres: Vec<String>,
    pub average_rating: Option<i64>,
    pub votes: usize,
}

impl MovieView {
    pub fn new<S: KeyValueStore>(catalog: &Catalog<S>, movie: &Movie) -> Self {
        Self {
            id: movie.id(),
            title: movie.title().to_string(),
            release_date: movie.release_date().format("%Y-%m-%d").to_string(),
            popularity: movie.popularity(),
            genre_ids: movie.genre_ids().to_vec(),
            genres: catalog.genre_names(movie),
            average_rating: movie.average_rating(),
            votes: movie.vote_count(),
        }
    }

    pub fn details(&self) -> String {
        format!(
            "=== {} ({}) ===\nReleased: {}\nPopularity: {}\nGenres: {}\nRating: {} ({} votes)\n",
            self.title,
            self.id,
            self.release_date,
            self.popularity,
            self.genres.join(", "),
            rating_label(self.average_rating),
            self.votes
        )
    }
}

pub fn movie_table<S: KeyValueStore>(catalog: &Catalog<S>, movies: &[&Movie]) -> String {
    let mut out = format!(
        "{:>4}  {:<tw$}  {:<10}  {:>6}  {:<gw$}  {:>6}  {:>5}\n",
        "ID",
        "Title",
        "Released",
        "Pop.",
        "Genres",
        "Rating",
        "Votes",
        tw = TITLE_WIDTH,
        gw = GENRES_WIDTH
    );
    for movie in movies {
        out.push_str(&format!(
            "{:>4}  {:<tw$}  {:<10}  {:>6.1}  {:<gw$}  {:>6}  {:>5}\n",
            movie.id(),
            truncate(movie.title(), TITLE_WIDTH),
            movie.release_date().format("%Y-%m-%d").to_string(),
            movie.popularity(),
            truncate(&catalog.genre_names(movie).join(", "), GENRES_WIDTH),
            rating_label(movie.average_rating()),
            movie.vote_count(),
            tw = TITLE_WIDTH,
            gw = GENRES_WIDTH
        ));
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdb::SqliteStore;

    #[test]
    fn test_rating_label() {
        assert_eq!(rating_label(None), "-");
        assert_eq!(rating_label(Some(7)), "7");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Heat", 10), "Heat");
        assert_eq!(truncate("Breakfast at Tiffany's", 10), "Breakfast…");
    }

    #[test]
    fn test_view_resolves_genres() {
        let catalog = Catalog::open(SqliteStore::in_memory().unwrap()).unwrap();
        let view = MovieView::new(&catalog, catalog.movie(1).unwrap());
        assert_eq!(view.genres, vec!["Action", "Science Fiction"]);
        assert_eq!(view.release_date, "2009-02-06");
        assert!(view.details().contains("Rating: - (0 votes)"));

        let table = movie_table(&catalog, &catalog.list_movies(&Default::default()));
        assert_eq!(table.lines().count(), 6);
        assert!(table.contains("Pulp Fiction"));
    }
}
