//! The catalog session: the single in-memory copy of both collections.
//!
//! Every mutation validates first and builds the updated collection, which
//! replaces the session copy only once the store has accepted it.

pub mod filter;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{CatalogError, Result};
use crate::model::{Genre, IdAllocator, Movie};
use crate::persistence::{SeedReport, Storage};
use crate::store::KeyValueStore;

pub use filter::{MovieFilter, SortKey, DEFAULT_FUZZY_THRESHOLD};

/// Label shown for genre ids that no longer resolve.
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Input for [`Catalog::add_movie`].
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub release_date: NaiveDate,
    pub popularity: f64,
    pub genre_ids: Vec<u64>,
}

/// Fields to change in [`Catalog::edit_movie`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct MovieChanges {
    pub title: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub popularity: Option<f64>,
    pub genre_ids: Option<Vec<u64>>,
}

impl MovieChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.release_date.is_none()
            && self.popularity.is_none()
            && self.genre_ids.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub total_movies: usize,
    pub total_genres: usize,
    pub total_votes: usize,
    pub rated_movies: usize,
    pub movies_by_genre: Vec<(String, usize)>,
}

pub struct Catalog<S: KeyValueStore> {
    storage: Storage<S>,
    genres: Vec<Genre>,
    movies: Vec<Movie>,
    genre_ids: IdAllocator,
    movie_ids: IdAllocator,
    seeded: SeedReport,
}

impl<S: KeyValueStore> Catalog<S> {
    /// Loads both collections and seeds the starter data into any that are
    /// empty.
    pub fn open(store: S) -> Result<Self> {
        let mut catalog = Self::open_empty(store)?;
        catalog.seeded = catalog.storage.initialize_defaults(
            &mut catalog.genres,
            &mut catalog.movies,
            &mut catalog.genre_ids,
            &mut catalog.movie_ids,
        )?;
        Ok(catalog)
    }

    /// Loads both collections without seeding.
    pub fn open_empty(store: S) -> Result<Self> {
        let storage = Storage::new(store);
        let mut genre_ids = IdAllocator::new();
        let mut movie_ids = IdAllocator::new();
        let genres = storage.load_genres(&mut genre_ids)?;
        let movies = storage.load_movies(&mut movie_ids)?;

        Ok(Self {
            storage,
            genres,
            movies,
            genre_ids,
            movie_ids,
            seeded: SeedReport::default(),
        })
    }

    /// What [`Catalog::open`] seeded, if anything.
    pub fn seeded(&self) -> SeedReport {
        self.seeded
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    // === Genres ===

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn genre(&self, id: u64) -> Result<&Genre> {
        self.genres
            .iter()
            .find(|g| g.id() == id)
            .ok_or(CatalogError::GenreNotFound(id))
    }

    pub fn add_genre(&mut self, name: &str) -> Result<&Genre> {
        let mut ids = self.genre_ids.clone();
        let genre = Genre::new(name, &mut ids)?;
        let mut genres = self.genres.clone();
        genres.push(genre);
        self.commit_genres(genres)?;
        self.genre_ids = ids;
        Ok(&self.genres[self.genres.len() - 1])
    }

    pub fn rename_genre(&mut self, id: u64, name: &str) -> Result<&Genre> {
        let idx = self.genre_index(id)?;
        let mut genres = self.genres.clone();
        genres[idx].rename(name)?;
        self.commit_genres(genres)?;
        Ok(&self.genres[idx])
    }

    /// Deletes a genre no movie references.
    pub fn delete_genre(&mut self, id: u64) -> Result<Genre> {
        let idx = self.genre_index(id)?;
        let movie_ids: Vec<u64> = self
            .movies
            .iter()
            .filter(|m| m.references_genre(id))
            .map(Movie::id)
            .collect();
        if !movie_ids.is_empty() {
            return Err(CatalogError::GenreInUse { id, movie_ids });
        }

        let mut genres = self.genres.clone();
        let removed = genres.remove(idx);
        self.commit_genres(genres)?;
        Ok(removed)
    }

    /// Resolves a movie's genre ids to names, in the movie's order.
    pub fn genre_names(&self, movie: &Movie) -> Vec<String> {
        movie
            .genre_ids()
            .iter()
            .map(|id| {
                self.genres
                    .iter()
                    .find(|g| g.id() == *id)
                    .map(|g| g.name().to_string())
                    .unwrap_or_else(|| UNKNOWN_GENRE.to_string())
            })
            .collect()
    }

    // === Movies ===

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn movie(&self, id: u64) -> Result<&Movie> {
        self.movies
            .iter()
            .find(|m| m.id() == id)
            .ok_or(CatalogError::MovieNotFound(id))
    }

    pub fn list_movies(&self, filter: &MovieFilter) -> Vec<&Movie> {
        filter.apply(&self.movies)
    }

    pub fn add_movie(&mut self, new: NewMovie) -> Result<&Movie> {
        self.check_genres_exist(&new.genre_ids)?;
        let mut ids = self.movie_ids.clone();
        let movie = Movie::new(
            &new.title,
            new.release_date,
            new.popularity,
            new.genre_ids,
            &mut ids,
        )?;
        let mut movies = self.movies.clone();
        movies.push(movie);
        self.commit_movies(movies)?;
        self.movie_ids = ids;
        Ok(&self.movies[self.movies.len() - 1])
    }

    /// Applies every change or none of them.
    pub fn edit_movie(&mut self, id: u64, changes: MovieChanges) -> Result<&Movie> {
        let idx = self.movie_index(id)?;
        if let Some(ref genre_ids) = changes.genre_ids {
            self.check_genres_exist(genre_ids)?;
        }

        let mut movies = self.movies.clone();
        let updated = &mut movies[idx];
        if let Some(title) = changes.title {
            updated.set_title(&title)?;
        }
        if let Some(date) = changes.release_date {
            updated.set_release_date(date)?;
        }
        if let Some(popularity) = changes.popularity {
            updated.set_popularity(popularity)?;
        }
        if let Some(genre_ids) = changes.genre_ids {
            updated.set_genre_ids(genre_ids)?;
        }

        self.commit_movies(movies)?;
        Ok(&self.movies[idx])
    }

    pub fn vote(&mut self, id: u64, score: i64) -> Result<&Movie> {
        let idx = self.movie_index(id)?;
        let mut movies = self.movies.clone();
        movies[idx].vote(score)?;
        self.commit_movies(movies)?;
        Ok(&self.movies[idx])
    }

    pub fn delete_movie(&mut self, id: u64) -> Result<Movie> {
        let idx = self.movie_index(id)?;
        let mut movies = self.movies.clone();
        let removed = movies.remove(idx);
        self.commit_movies(movies)?;
        Ok(removed)
    }

    // === Maintenance ===

    pub fn stats(&self) -> CatalogStats {
        let movies_by_genre = self
            .genres
            .iter()
            .map(|g| {
                let count = self
                    .movies
                    .iter()
                    .filter(|m| m.references_genre(g.id()))
                    .count();
                (g.name().to_string(), count)
            })
            .collect();

        CatalogStats {
            total_movies: self.movies.len(),
            total_genres: self.genres.len(),
            total_votes: self.movies.iter().map(Movie::vote_count).sum(),
            rated_movies: self.movies.iter().filter(|m| m.vote_count() > 0).count(),
            movies_by_genre,
        }
    }

    /// Drops both stored collections and starts the session from scratch.
    pub fn reset(&mut self) -> Result<()> {
        self.storage.clear()?;
        self.genres.clear();
        self.movies.clear();
        self.genre_ids.reset();
        self.movie_ids.reset();
        tracing::info!("Catalog reset");
        Ok(())
    }

    fn commit_genres(&mut self, genres: Vec<Genre>) -> Result<()> {
        self.storage.save_genres(&genres)?;
        self.genres = genres;
        Ok(())
    }

    fn commit_movies(&mut self, movies: Vec<Movie>) -> Result<()> {
        self.storage.save_movies(&movies)?;
        self.movies = movies;
        Ok(())
    }

    fn genre_index(&self, id: u64) -> Result<usize> {
        self.genres
            .iter()
            .position(|g| g.id() == id)
            .ok_or(CatalogError::GenreNotFound(id))
    }

    fn movie_index(&self, id: u64) -> Result<usize> {
        self.movies
            .iter()
            .position(|m| m.id() == id)
            .ok_or(CatalogError::MovieNotFound(id))
    }

    fn check_genres_exist(&self, genre_ids: &[u64]) -> Result<()> {
        // Zero is left to the entity validator so it reports the usual error
        if let Some(missing) = genre_ids
            .iter()
            .find(|id| **id != 0 && !self.genres.iter().any(|g| g.id() == **id))
        {
            return Err(CatalogError::InvalidGenreList(format!(
                "genre {} does not exist",
                missing
            )));
        }
        Ok(())
    }
}
