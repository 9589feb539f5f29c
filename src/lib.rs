pub mod catalog;
pub mod error;
pub mod model;
pub mod persistence;
pub mod store;

pub use catalog::{
    Catalog, CatalogStats, MovieChanges, MovieFilter, NewMovie, SortKey, UNKNOWN_GENRE,
};
pub use error::{CatalogError, Result};
pub use model::{Genre, GenreRecord, IdAllocator, Movie, MovieRecord};
pub use persistence::{SeedReport, Storage, GENRES_KEY, MOVIES_KEY};
pub use store::{KeyValueStore, SqliteStore};
