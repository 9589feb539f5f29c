use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid title: {0}")]
    InvalidTitle(String),

    #[error("Invalid release date: {0}")]
    InvalidDate(String),

    #[error("Invalid popularity: {0}")]
    InvalidPopularity(String),

    #[error("Invalid genre list: {0}")]
    InvalidGenreList(String),

    #[error("Invalid genre name: {0}")]
    InvalidName(String),

    #[error("Invalid rating: {0}")]
    InvalidRating(String),

    #[error("Stored collection '{key}' is corrupted: {reason}")]
    StoreCorrupted { key: String, reason: String },

    #[error("Genre {id} is used by movies {movie_ids:?}")]
    GenreInUse { id: u64, movie_ids: Vec<u64> },

    #[error("Genre not found: {0}")]
    GenreNotFound(u64),

    #[error("Movie not found: {0}")]
    MovieNotFound(u64),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CatalogError {
    /// True for errors caused by user input rather than the environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidTitle(_)
                | Self::InvalidDate(_)
                | Self::InvalidPopularity(_)
                | Self::InvalidGenreList(_)
                | Self::InvalidName(_)
                | Self::InvalidRating(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
