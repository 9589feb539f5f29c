use std::cmp::Ordering;
use std::str::FromStr;

use chrono::Datelike;
use strsim::jaro_winkler;

use crate::model::Movie;

/// Default Jaro-Winkler similarity needed for a fuzzy title match.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.7;

/// Ordering applied to movie listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Id,
    Title,
    ReleaseDate,
    /// Most popular first
    Popularity,
    /// Best rated first, unrated last
    Rating,
}

impl SortKey {
    fn compare(&self, a: &Movie, b: &Movie) -> Ordering {
        match self {
            SortKey::Id => a.id().cmp(&b.id()),
            SortKey::Title => a.title().to_lowercase().cmp(&b.title().to_lowercase()),
            SortKey::ReleaseDate => a.release_date().cmp(&b.release_date()),
            SortKey::Popularity => b.popularity().total_cmp(&a.popularity()),
            SortKey::Rating => match (a.average_rating(), b.average_rating()) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
        .then_with(|| a.id().cmp(&b.id()))
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(SortKey::Id),
            "title" => Ok(SortKey::Title),
            "date" | "release" | "release-date" => Ok(SortKey::ReleaseDate),
            "popularity" => Ok(SortKey::Popularity),
            "rating" => Ok(SortKey::Rating),
            other => Err(format!(
                "unknown sort key '{}' (expected id, title, date, popularity or rating)",
                other
            )),
        }
    }
}

/// Criteria for listing movies. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct MovieFilter {
    /// Case-insensitive title substring, or fuzzy query when `fuzzy` is set
    pub title: Option<String>,
    pub fuzzy: bool,
    pub fuzzy_threshold: Option<f64>,
    pub genre_id: Option<u64>,
    /// Minimum average rating; unrated movies never match
    pub min_rating: Option<i64>,
    pub from_year: Option<i32>,
    pub to_year: Option<i32>,
    pub sort: SortKey,
    pub limit: Option<usize>,
}

impl MovieFilter {
    pub fn matches(&self, movie: &Movie) -> bool {
        if let Some(ref query) = self.title {
            let matched = if self.fuzzy {
                fuzzy_title_match(
                    query,
                    movie.title(),
                    self.fuzzy_threshold.unwrap_or(DEFAULT_FUZZY_THRESHOLD),
                )
            } else {
                contains_ignore_case(movie.title(), query)
            };
            if !matched {
                return false;
            }
        }

        if let Some(genre_id) = self.genre_id {
            if !movie.references_genre(genre_id) {
                return false;
            }
        }

        if let Some(min) = self.min_rating {
            match movie.average_rating() {
                Some(avg) if avg >= min => {}
                _ => return false,
            }
        }

        let year = movie.release_date().year();
        if self.from_year.is_some_and(|from| year < from) {
            return false;
        }
        if self.to_year.is_some_and(|to| year > to) {
            return false;
        }

        true
    }

    /// Filters, sorts and truncates `movies`.
    pub fn apply<'a>(&self, movies: impl IntoIterator<Item = &'a Movie>) -> Vec<&'a Movie> {
        let mut selected: Vec<&Movie> = movies.into_iter().filter(|m| self.matches(m)).collect();
        selected.sort_by(|a, b| self.sort.compare(a, b));
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

/// Typo-tolerant title match. Queries shorter than four characters are too
/// ambiguous for similarity scoring and fall back to substring matching.
fn fuzzy_title_match(query: &str, title: &str, threshold: f64) -> bool {
    let query = query.trim().to_lowercase();
    if query.chars().count() < 4 {
        return contains_ignore_case(title, &query);
    }

    let title = title.to_lowercase();
    if title.contains(&query) {
        return true;
    }

    let best = title
        .split_whitespace()
        .map(|word| jaro_winkler(&query, word))
        .fold(jaro_winkler(&query, &title), f64::max);
    best >= threshold
}
