//! Saving and loading the movie and genre collections.
//!
//! Each collection is a JSON array of flat records stored under its own key.
//! Loading goes through the entities' rehydration constructors and advances
//! the matching id allocator past every stored id. A stored value that cannot
//! be read back is dropped and replaced by an empty collection.

pub mod defaults;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CatalogError, Result};
use crate::model::{Genre, GenreRecord, IdAllocator, Movie, MovieRecord};
use crate::store::KeyValueStore;

pub use defaults::{SeedReport, DEFAULT_GENRES};

pub const MOVIES_KEY: &str = "cmdb_movies";
pub const GENRES_KEY: &str = "cmdb_genres";

/// Collection-level persistence on top of a [`KeyValueStore`].
pub struct Storage<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn save_movies(&self, movies: &[Movie]) -> Result<()> {
        let records: Vec<MovieRecord> = movies.iter().map(Movie::to_record).collect();
        self.save_records(MOVIES_KEY, &records)
    }

    pub fn save_genres(&self, genres: &[Genre]) -> Result<()> {
        let records: Vec<GenreRecord> = genres.iter().map(Genre::to_record).collect();
        self.save_records(GENRES_KEY, &records)
    }

    pub fn load_movies(&self, ids: &mut IdAllocator) -> Result<Vec<Movie>> {
        self.load_collection(MOVIES_KEY, Movie::rehydrate, Movie::id, ids)
    }

    pub fn load_genres(&self, ids: &mut IdAllocator) -> Result<Vec<Genre>> {
        self.load_collection(GENRES_KEY, Genre::rehydrate, Genre::id, ids)
    }

    /// Removes both collections from the store.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(MOVIES_KEY)?;
        self.store.remove(GENRES_KEY)?;
        Ok(())
    }

    fn save_records<R: Serialize>(&self, key: &str, records: &[R]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.store.set(key, &json)?;
        tracing::debug!("Saved {} records under {}", records.len(), key);
        Ok(())
    }

    fn load_collection<R, T>(
        &self,
        key: &str,
        rehydrate: impl Fn(R) -> Result<T>,
        id_of: impl Fn(&T) -> u64,
        ids: &mut IdAllocator,
    ) -> Result<Vec<T>>
    where
        R: DeserializeOwned,
    {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };

        let items = match decode(key, &raw, rehydrate) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!("{}; discarding stored value", err);
                if let Err(remove_err) = self.store.remove(key) {
                    tracing::warn!("Failed to remove corrupted {}: {}", key, remove_err);
                }
                return Ok(Vec::new());
            }
        };

        if let Some(max_id) = items.iter().map(&id_of).max() {
            ids.observe(max_id);
        }
        tracing::debug!("Loaded {} records from {}", items.len(), key);
        Ok(items)
    }
}

/// Parses a stored array and rehydrates every record. Any failure is reported
/// as [`CatalogError::StoreCorrupted`].
fn decode<R, T>(key: &str, raw: &str, rehydrate: impl Fn(R) -> Result<T>) -> Result<Vec<T>>
where
    R: DeserializeOwned,
{
    let corrupted = |reason: String| CatalogError::StoreCorrupted {
        key: key.to_string(),
        reason,
    };

    let records: Vec<R> = serde_json::from_str(raw).map_err(|e| corrupted(e.to_string()))?;
    records
        .into_iter()
        .map(|record| rehydrate(record).map_err(|e| corrupted(e.to_string())))
        .collect()
}
