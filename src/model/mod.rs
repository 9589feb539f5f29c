//! Catalog entities and id allocation.

pub mod genre;
pub mod ids;
pub mod movie;

pub use genre::{Genre, GenreRecord};
pub use ids::IdAllocator;
pub use movie::{Movie, MovieRecord};
