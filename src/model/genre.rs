use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::model::ids::IdAllocator;

/// Maximum genre name length, counted on the raw input.
pub const MAX_NAME_LEN: usize = 100;

/// A film genre. The id is fixed at construction; only the name changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Genre {
    id: u64,
    name: String,
}

/// Flat storage form of a [`Genre`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreRecord {
    pub id: u64,
    pub name: String,
}

impl Genre {
    /// Creates a genre, taking its id from `ids` only once the name is valid.
    pub fn new(name: &str, ids: &mut IdAllocator) -> Result<Self> {
        let name = validate_name(name)?;
        Ok(Self {
            id: ids.allocate(),
            name,
        })
    }

    /// Rebuilds a genre from storage. The name is re-validated; the id is
    /// trusted as-is and no allocator is consumed.
    pub fn rehydrate(record: GenreRecord) -> Result<Self> {
        Ok(Self {
            id: record.id,
            name: validate_name(&record.name)?,
        })
    }

    pub fn to_record(&self) -> GenreRecord {
        GenreRecord {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, new_name: &str) -> Result<()> {
        self.name = validate_name(new_name)?;
        Ok(())
    }
}

fn validate_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::InvalidName(
            "genre name must not be empty".to_string(),
        ));
    }
    if raw.chars().count() > MAX_NAME_LEN {
        return Err(CatalogError::InvalidName(format!(
            "genre name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_name() {
        let mut ids = IdAllocator::new();
        let genre = Genre::new("  Drama  ", &mut ids).unwrap();
        assert_eq!(genre.name(), "Drama");
        assert_eq!(genre.id(), 1);
    }

    #[test]
    fn test_ids_strictly_increase() {
        let mut ids = IdAllocator::new();
        let names = ["Action", "Comedy", "Drama", "Horror"];
        let created: Vec<u64> = names
            .iter()
            .map(|n| Genre::new(n, &mut ids).unwrap().id())
            .collect();
        assert!(created.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut ids = IdAllocator::new();
        assert!(matches!(
            Genre::new("", &mut ids),
            Err(CatalogError::InvalidName(_))
        ));
        assert!(matches!(
            Genre::new("   ", &mut ids),
            Err(CatalogError::InvalidName(_))
        ));
        assert!(matches!(
            Genre::new(&"a".repeat(101), &mut ids),
            Err(CatalogError::InvalidName(_))
        ));
        // Rejected names do not burn ids
        assert_eq!(ids.last(), 0);
    }

    #[test]
    fn test_name_at_length_limit() {
        let mut ids = IdAllocator::new();
        let name = "é".repeat(100);
        let genre = Genre::new(&name, &mut ids).unwrap();
        assert_eq!(genre.name(), name);
    }

    #[test]
    fn test_rename_keeps_old_name_on_failure() {
        let mut ids = IdAllocator::new();
        let mut genre = Genre::new("Comedy", &mut ids).unwrap();
        assert!(genre.rename("").is_err());
        assert_eq!(genre.name(), "Comedy");

        genre.rename(" Dark Comedy ").unwrap();
        assert_eq!(genre.name(), "Dark Comedy");
        assert_eq!(genre.id(), 1);
    }

    #[test]
    fn test_rehydrate_keeps_stored_id() {
        let genre = Genre::rehydrate(GenreRecord {
            id: 42,
            name: "Western".to_string(),
        })
        .unwrap();
        assert_eq!(genre.id(), 42);
        assert_eq!(genre.to_record().name, "Western");
    }
}
