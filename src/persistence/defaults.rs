//! Starter data written the first time a catalog is opened.

use chrono::NaiveDate;

use crate::error::Result;
use crate::model::{Genre, IdAllocator, Movie};
use crate::persistence::Storage;
use crate::store::KeyValueStore;

pub const DEFAULT_GENRES: [&str; 4] = ["Action", "Comedy", "Drama", "Science Fiction"];

struct SeedMovie {
    title: &'static str,
    released: (i32, u32, u32),
    popularity: f64,
    genres: &'static [&'static str],
}

const DEFAULT_MOVIES: [SeedMovie; 5] = [
    SeedMovie {
        title: "Coraline",
        released: (2009, 2, 6),
        popularity: 8.0,
        genres: &["Action", "Science Fiction"],
    },
    SeedMovie {
        title: "8 Mile",
        released: (2002, 11, 8),
        popularity: 7.1,
        genres: &["Comedy", "Drama"],
    },
    SeedMovie {
        title: "Pulp Fiction",
        released: (1994, 10, 14),
        popularity: 8.9,
        genres: &["Action", "Drama"],
    },
    SeedMovie {
        title: "Breakfast at Tiffany's",
        released: (1961, 10, 5),
        popularity: 8.5,
        genres: &["Comedy", "Drama"],
    },
    SeedMovie {
        title: "Edward Scissorhands",
        released: (1990, 12, 7),
        popularity: 7.9,
        genres: &["Drama", "Science Fiction"],
    },
];

/// What [`Storage::initialize_defaults`] wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub genres: usize,
    pub movies: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.genres == 0 && self.movies == 0
    }
}

impl<S: KeyValueStore> Storage<S> {
    /// Seeds whichever collection is empty, using the regular validating
    /// constructors, and saves it. Seed movies reference genres by name;
    /// names missing from `genres` are skipped.
    pub fn initialize_defaults(
        &self,
        genres: &mut Vec<Genre>,
        movies: &mut Vec<Movie>,
        genre_ids: &mut IdAllocator,
        movie_ids: &mut IdAllocator,
    ) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        if genres.is_empty() {
            for name in DEFAULT_GENRES {
                genres.push(Genre::new(name, genre_ids)?);
            }
            self.save_genres(genres)?;
            report.genres = genres.len();
        }

        if movies.is_empty() {
            for seed in &DEFAULT_MOVIES {
                let (y, m, d) = seed.released;
                let released = NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);
                let ids: Vec<u64> = seed
                    .genres
                    .iter()
                    .filter_map(|name| genres.iter().find(|g| g.name() == *name))
                    .map(Genre::id)
                    .collect();
                movies.push(Movie::new(seed.title, released, seed.popularity, ids, movie_ids)?);
            }
            self.save_movies(movies)?;
            report.movies = movies.len();
        }

        if !report.is_empty() {
            tracing::info!(
                "Seeded {} genres and {} movies",
                report.genres,
                report.movies
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{GENRES_KEY, MOVIES_KEY};
    use crate::store::SqliteStore;

    #[test]
    fn test_seeds_empty_store() {
        let storage = Storage::new(SqliteStore::in_memory().unwrap());
        let (mut genres, mut movies) = (Vec::new(), Vec::new());
        let (mut genre_ids, mut movie_ids) = (IdAllocator::new(), IdAllocator::new());

        let report = storage
            .initialize_defaults(&mut genres, &mut movies, &mut genre_ids, &mut movie_ids)
            .unwrap();

        assert_eq!(report, SeedReport { genres: 4, movies: 5 });
        assert_eq!(genres[3].name(), "Science Fiction");
        assert_eq!(movies[0].title(), "Coraline");
        assert_eq!(movies[0].genre_ids(), &[1, 4]);
        assert_eq!(movies[4].genre_ids(), &[3, 4]);
        assert!(storage.store().get(GENRES_KEY).unwrap().is_some());
        assert!(storage.store().get(MOVIES_KEY).unwrap().is_some());
    }

    #[test]
    fn test_existing_collections_untouched() {
        let storage = Storage::new(SqliteStore::in_memory().unwrap());
        let (mut genre_ids, mut movie_ids) = (IdAllocator::new(), IdAllocator::new());
        let mut genres = vec![Genre::new("Drama", &mut genre_ids).unwrap()];
        let mut movies = Vec::new();

        let report = storage
            .initialize_defaults(&mut genres, &mut movies, &mut genre_ids, &mut movie_ids)
            .unwrap();

        assert_eq!(report.genres, 0);
        assert_eq!(genres.len(), 1);
        assert_eq!(movies.len(), 5);
        // Only "Drama" exists, so seed movies keep just that reference
        assert_eq!(movies[0].genre_ids(), &[] as &[u64]);
        assert_eq!(movies[1].genre_ids(), &[1]);
    }
}
