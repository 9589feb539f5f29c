use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::model::ids::IdAllocator;

pub const MAX_TITLE_LEN: usize = 100;
pub const MIN_POPULARITY: f64 = 0.0;
pub const MAX_POPULARITY: f64 = 100.0;
pub const MIN_RATING: i64 = 0;
pub const MAX_RATING: i64 = 10;

/// Earliest accepted release date.
pub fn earliest_release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// A catalogued movie.
///
/// Descriptive fields are validated on every assignment. `ratings` only grows,
/// through [`Movie::vote`].
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    id: u64,
    title: String,
    release_date: NaiveDate,
    popularity: f64,
    genre_ids: Vec<u64>,
    ratings: Vec<i64>,
}

/// Flat storage form of a [`Movie`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    pub id: u64,
    pub title: String,
    #[serde(with = "release_date_format")]
    pub release_date: NaiveDate,
    pub popularity: f64,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub ratings: Vec<i64>,
}

impl Movie {
    /// Validates every field, then takes an id from `ids`.
    pub fn new(
        title: &str,
        release_date: NaiveDate,
        popularity: f64,
        genre_ids: Vec<u64>,
        ids: &mut IdAllocator,
    ) -> Result<Self> {
        let title = validate_title(title)?;
        validate_release_date(release_date)?;
        validate_popularity(popularity)?;
        validate_genre_ids(&genre_ids)?;

        Ok(Self {
            id: ids.allocate(),
            title,
            release_date,
            popularity,
            genre_ids,
            ratings: Vec::new(),
        })
    }

    /// Rebuilds a movie from storage.
    ///
    /// Descriptive fields go through the usual validators. The id and the
    /// rating history were accepted when first written and are taken verbatim.
    pub fn rehydrate(record: MovieRecord) -> Result<Self> {
        let title = validate_title(&record.title)?;
        validate_release_date(record.release_date)?;
        validate_popularity(record.popularity)?;
        validate_genre_ids(&record.genre_ids)?;

        Ok(Self {
            id: record.id,
            title,
            release_date: record.release_date,
            popularity: record.popularity,
            genre_ids: record.genre_ids,
            ratings: record.ratings,
        })
    }

    pub fn to_record(&self) -> MovieRecord {
        MovieRecord {
            id: self.id,
            title: self.title.clone(),
            release_date: self.release_date,
            popularity: self.popularity,
            genre_ids: self.genre_ids.clone(),
            ratings: self.ratings.clone(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn release_date(&self) -> NaiveDate {
        self.release_date
    }

    pub fn popularity(&self) -> f64 {
        self.popularity
    }

    pub fn genre_ids(&self) -> &[u64] {
        &self.genre_ids
    }

    pub fn ratings(&self) -> &[i64] {
        &self.ratings
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        self.title = validate_title(title)?;
        Ok(())
    }

    pub fn set_release_date(&mut self, date: NaiveDate) -> Result<()> {
        validate_release_date(date)?;
        self.release_date = date;
        Ok(())
    }

    pub fn set_popularity(&mut self, popularity: f64) -> Result<()> {
        validate_popularity(popularity)?;
        self.popularity = popularity;
        Ok(())
    }

    pub fn set_genre_ids(&mut self, genre_ids: Vec<u64>) -> Result<()> {
        validate_genre_ids(&genre_ids)?;
        self.genre_ids = genre_ids;
        Ok(())
    }

    /// Records a score between 0 and 10 inclusive.
    pub fn vote(&mut self, score: i64) -> Result<()> {
        if !(MIN_RATING..=MAX_RATING).contains(&score) {
            return Err(CatalogError::InvalidRating(format!(
                "score must be an integer between {} and {}, got {}",
                MIN_RATING, MAX_RATING, score
            )));
        }
        self.ratings.push(score);
        Ok(())
    }

    /// Mean of all scores rounded half-up, or `None` before the first vote.
    pub fn average_rating(&self) -> Option<i64> {
        if self.ratings.is_empty() {
            return None;
        }
        // Rehydrated ratings are unbounded; widen so the sum cannot overflow
        let sum: i128 = self.ratings.iter().map(|&r| i128::from(r)).sum();
        let mean = sum as f64 / self.ratings.len() as f64;
        Some((mean + 0.5).floor() as i64)
    }

    pub fn vote_count(&self) -> usize {
        self.ratings.len()
    }

    pub fn references_genre(&self, genre_id: u64) -> bool {
        self.genre_ids.contains(&genre_id)
    }
}

fn validate_title(raw: &str) -> Result<String> {
    if raw.chars().count() > MAX_TITLE_LEN {
        return Err(CatalogError::InvalidTitle(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(raw.trim().to_string())
}

fn validate_release_date(date: NaiveDate) -> Result<()> {
    validate_release_date_on(date, Local::now().date_naive())
}

pub(crate) fn validate_release_date_on(date: NaiveDate, today: NaiveDate) -> Result<()> {
    let earliest = earliest_release_date();
    if date < earliest || date > today {
        return Err(CatalogError::InvalidDate(format!(
            "{} is outside {} ..= {}",
            date, earliest, today
        )));
    }
    Ok(())
}

fn validate_popularity(popularity: f64) -> Result<()> {
    if !popularity.is_finite() || !(MIN_POPULARITY..=MAX_POPULARITY).contains(&popularity) {
        return Err(CatalogError::InvalidPopularity(format!(
            "popularity must be a number between {} and {}, got {}",
            MIN_POPULARITY, MAX_POPULARITY, popularity
        )));
    }
    Ok(())
}

fn validate_genre_ids(genre_ids: &[u64]) -> Result<()> {
    if let Some(bad) = genre_ids.iter().find(|id| **id == 0) {
        return Err(CatalogError::InvalidGenreList(format!(
            "genre ids must be positive integers, got {}",
            bad
        )));
    }
    Ok(())
}

/// `releaseDate` is written as a UTC midnight date-time
/// (`2009-02-06T00:00:00.000Z`). Reading accepts any RFC 3339 date-time or a
/// bare `YYYY-MM-DD`.
pub mod release_date_format {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const WRITE_FORMAT: &str = "%Y-%m-%dT00:00:00.000Z";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(WRITE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid release date '{}'", raw)))
    }

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc).date_naive());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample(ids: &mut IdAllocator) -> Movie {
        Movie::new("T", date(2000, 1, 1), 50.0, vec![1, 2], ids).unwrap()
    }

    #[test]
    fn test_new_movie_has_no_rating() {
        let mut ids = IdAllocator::new();
        let movie = sample(&mut ids);
        assert_eq!(movie.average_rating(), None);
        assert_eq!(movie.vote_count(), 0);
        assert_eq!(movie.genre_ids(), &[1, 2]);
    }

    #[test]
    fn test_vote_and_average() {
        let mut ids = IdAllocator::new();
        let mut movie = sample(&mut ids);
        movie.vote(6).unwrap();
        movie.vote(8).unwrap();
        assert_eq!(movie.average_rating(), Some(7));
        assert_eq!(movie.vote_count(), 2);
    }

    #[test]
    fn test_out_of_range_vote_leaves_state() {
        let mut ids = IdAllocator::new();
        let mut movie = sample(&mut ids);
        movie.vote(6).unwrap();
        movie.vote(8).unwrap();

        assert!(matches!(movie.vote(11), Err(CatalogError::InvalidRating(_))));
        assert!(matches!(movie.vote(-1), Err(CatalogError::InvalidRating(_))));
        assert_eq!(movie.vote_count(), 2);
        assert_eq!(movie.ratings(), &[6, 8]);
    }

    #[test]
    fn test_average_rounds_half_up() {
        let mut ids = IdAllocator::new();
        let mut movie = sample(&mut ids);
        movie.vote(6).unwrap();
        movie.vote(7).unwrap();
        assert_eq!(movie.average_rating(), Some(7));

        movie.vote(0).unwrap();
        // (6 + 7 + 0) / 3 = 4.33
        assert_eq!(movie.average_rating(), Some(4));
    }

    #[test]
    fn test_release_date_bounds() {
        let today = date(2024, 6, 15);
        assert!(validate_release_date_on(date(1900, 1, 1), today).is_ok());
        assert!(validate_release_date_on(today, today).is_ok());
        assert!(matches!(
            validate_release_date_on(date(1899, 12, 31), today),
            Err(CatalogError::InvalidDate(_))
        ));
        assert!(matches!(
            validate_release_date_on(date(2024, 6, 16), today),
            Err(CatalogError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_release_date_today_accepted() {
        let mut ids = IdAllocator::new();
        let today = Local::now().date_naive();
        assert!(Movie::new("Today", today, 1.0, vec![], &mut ids).is_ok());
        let tomorrow = today.succ_opt().unwrap();
        assert!(matches!(
            Movie::new("Tomorrow", tomorrow, 1.0, vec![], &mut ids),
            Err(CatalogError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_invalid_fields_rejected_without_allocating() {
        let mut ids = IdAllocator::new();
        let long = "x".repeat(101);

        assert!(matches!(
            Movie::new(&long, date(2000, 1, 1), 10.0, vec![], &mut ids),
            Err(CatalogError::InvalidTitle(_))
        ));
        assert!(matches!(
            Movie::new("T", date(1850, 1, 1), 10.0, vec![], &mut ids),
            Err(CatalogError::InvalidDate(_))
        ));
        assert!(matches!(
            Movie::new("T", date(2000, 1, 1), 100.5, vec![], &mut ids),
            Err(CatalogError::InvalidPopularity(_))
        ));
        assert!(matches!(
            Movie::new("T", date(2000, 1, 1), f64::NAN, vec![], &mut ids),
            Err(CatalogError::InvalidPopularity(_))
        ));
        assert!(matches!(
            Movie::new("T", date(2000, 1, 1), 10.0, vec![3, 0], &mut ids),
            Err(CatalogError::InvalidGenreList(_))
        ));
        assert_eq!(ids.last(), 0);
    }

    #[test]
    fn test_setters_fail_without_side_effect() {
        let mut ids = IdAllocator::new();
        let mut movie = sample(&mut ids);

        assert!(movie.set_title(&"y".repeat(150)).is_err());
        assert!(movie.set_release_date(date(1800, 1, 1)).is_err());
        assert!(movie.set_popularity(-0.1).is_err());
        assert!(movie.set_genre_ids(vec![0]).is_err());

        assert_eq!(movie.title(), "T");
        assert_eq!(movie.release_date(), date(2000, 1, 1));
        assert_eq!(movie.popularity(), 50.0);
        assert_eq!(movie.genre_ids(), &[1, 2]);

        movie.set_title("  Heat ").unwrap();
        movie.set_popularity(100.0).unwrap();
        movie.set_genre_ids(vec![]).unwrap();
        assert_eq!(movie.title(), "Heat");
        assert_eq!(movie.popularity(), 100.0);
        assert!(movie.genre_ids().is_empty());
    }

    #[test]
    fn test_rehydrate_trusts_id_and_ratings() {
        let record = MovieRecord {
            id: 99,
            title: "Old".to_string(),
            release_date: date(1999, 3, 31),
            popularity: 12.5,
            genre_ids: vec![4],
            ratings: vec![10, 40],
        };
        let movie = Movie::rehydrate(record.clone()).unwrap();
        assert_eq!(movie.id(), 99);
        assert_eq!(movie.ratings(), &[10, 40]);
        assert_eq!(movie.average_rating(), Some(25));
        assert_eq!(movie.to_record(), record);
    }

    #[test]
    fn test_average_of_extreme_stored_ratings() {
        let record = MovieRecord {
            id: 3,
            title: "Old".to_string(),
            release_date: date(1999, 3, 31),
            popularity: 12.5,
            genre_ids: vec![],
            ratings: vec![i64::MAX, 1],
        };
        let movie = Movie::rehydrate(record).unwrap();
        assert_eq!(movie.average_rating(), Some(1 << 62));

        let mut low = movie.to_record();
        low.ratings = vec![i64::MIN, i64::MIN, 0];
        assert!(Movie::rehydrate(low).unwrap().average_rating().unwrap() < 0);
    }

    #[test]
    fn test_record_json_layout() {
        let record = MovieRecord {
            id: 1,
            title: "Coraline".to_string(),
            release_date: date(2009, 2, 6),
            popularity: 8.0,
            genre_ids: vec![1, 4],
            ratings: vec![7],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["releaseDate"], "2009-02-06T00:00:00.000Z");
        assert_eq!(json["genreIds"], serde_json::json!([1, 4]));
        assert_eq!(json["ratings"], serde_json::json!([7]));
    }

    #[test]
    fn test_release_date_parsing() {
        assert_eq!(
            release_date_format::parse("1994-10-14T00:00:00.000Z"),
            Some(date(1994, 10, 14))
        );
        assert_eq!(
            release_date_format::parse("1994-10-14T23:30:00-02:00"),
            Some(date(1994, 10, 15))
        );
        assert_eq!(release_date_format::parse("1994-10-14"), Some(date(1994, 10, 14)));
        assert_eq!(release_date_format::parse("14/10/1994"), None);
    }
}
