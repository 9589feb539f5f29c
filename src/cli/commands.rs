use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use cmdb::model::movie::release_date_format;
use cmdb::{Catalog, MovieChanges, MovieFilter, NewMovie, SortKey, SqliteStore};

use crate::cli::render;
use crate::error::Result;

#[derive(Parser)]
#[command(name = "cmdb")]
#[command(about = "Movie and genre catalog backed by a local key-value store")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # List the catalog (seeded with starter data on first use)
    cmdb movies list

    # Add a genre and a movie that uses it
    cmdb genres add "Horror"
    cmdb movies add --title "Alien" --date 1979-05-25 --popularity 80 --genre 4,5

    # Rate a movie from 0 to 10
    cmdb movies vote 3 9

    # Fuzzy title search, best rated first
    cmdb movies list --title "pulp fictoin" --fuzzy --sort rating

    # Use a different database file
    cmdb --db ~/movies.db stats
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the catalog database
    #[arg(long, default_value = ".cmdb.db")]
    pub db: PathBuf,

    /// Do not seed starter genres and movies into an empty catalog
    #[arg(long)]
    pub no_seed: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage genres
    Genres {
        #[command(subcommand)]
        command: GenreCommands,
    },

    /// Manage movies
    Movies {
        #[command(subcommand)]
        command: MovieCommands,
    },

    /// Show catalog statistics
    Stats {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete every stored movie and genre
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum GenreCommands {
    /// List genres
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Add a genre
    Add {
        /// Genre name (1-100 characters)
        name: String,
    },

    /// Rename a genre
    Rename {
        id: u64,
        /// New name (1-100 characters)
        name: String,
    },

    /// Delete a genre no movie uses
    Delete { id: u64 },
}

#[derive(Subcommand)]
pub enum MovieCommands {
    /// List movies
    List {
        /// Filter by title (case-insensitive substring)
        #[arg(long)]
        title: Option<String>,

        /// Match the title filter with typo tolerance
        #[arg(long)]
        fuzzy: bool,

        /// Similarity threshold for fuzzy matching (0.0-1.0, default 0.7)
        #[arg(long)]
        fuzzy_threshold: Option<f64>,

        /// Only movies in this genre
        #[arg(long)]
        genre: Option<u64>,

        /// Only movies whose average rating is at least this
        #[arg(long)]
        min_rating: Option<i64>,

        /// Released in or after this year
        #[arg(long)]
        from_year: Option<i32>,

        /// Released in or before this year
        #[arg(long)]
        to_year: Option<i32>,

        /// Sort by id, title, date, popularity or rating
        #[arg(long, default_value = "id")]
        sort: SortKey,

        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show one movie
    Show {
        id: u64,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Add a movie
    Add {
        /// Title (up to 100 characters)
        #[arg(long)]
        title: String,

        /// Release date (YYYY-MM-DD), between 1900-01-01 and today
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,

        /// Popularity from 0 to 100
        #[arg(long)]
        popularity: f64,

        /// Genre ids (comma separated or repeated)
        #[arg(long = "genre", value_delimiter = ',')]
        genres: Vec<u64>,
    },

    /// Change a movie's title, date, popularity or genres
    Edit {
        id: u64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        #[arg(long)]
        popularity: Option<f64>,

        /// Replacement genre ids (comma separated)
        #[arg(long, value_delimiter = ',')]
        genres: Option<Vec<u64>>,
    },

    /// Rate a movie
    Vote {
        id: u64,

        /// Score from 0 to 10
        #[arg(allow_hyphen_values = true)]
        score: i64,
    },

    /// Delete a movie
    Delete { id: u64 },
}

fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    release_date_format::parse(raw).ok_or_else(|| format!("'{}' is not a YYYY-MM-DD date", raw))
}

pub fn open_catalog(db_path: &Path, seed: bool) -> Result<Catalog<SqliteStore>> {
    let store = SqliteStore::new(db_path)?;
    let catalog = if seed {
        Catalog::open(store)?
    } else {
        Catalog::open_empty(store)?
    };
    Ok(catalog)
}

// === Genres ===

pub fn list_genres(catalog: &Catalog<SqliteStore>, format: &str) -> Result<()> {
    if format == "json" {
        let records: Vec<_> = catalog.genres().iter().map(|g| g.to_record()).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if catalog.genres().is_empty() {
        println!("No genres");
        return Ok(());
    }
    for genre in catalog.genres() {
        println!("{} - {}", genre.id(), genre.name());
    }
    Ok(())
}

pub fn add_genre(catalog: &mut Catalog<SqliteStore>, name: &str) -> Result<()> {
    let genre = catalog.add_genre(name)?;
    println!("Added genre {} - {}", genre.id(), genre.name());
    Ok(())
}

pub fn rename_genre(catalog: &mut Catalog<SqliteStore>, id: u64, name: &str) -> Result<()> {
    let genre = catalog.rename_genre(id, name)?;
    println!("Renamed genre {} to {}", genre.id(), genre.name());
    Ok(())
}

pub fn delete_genre(catalog: &mut Catalog<SqliteStore>, id: u64) -> Result<()> {
    let genre = catalog.delete_genre(id)?;
    println!("Deleted genre {} - {}", genre.id(), genre.name());
    Ok(())
}

// === Movies ===

pub fn list_movies(
    catalog: &Catalog<SqliteStore>,
    filter: &MovieFilter,
    format: &str,
) -> Result<()> {
    let movies = catalog.list_movies(filter);

    if format == "json" {
        let views: Vec<_> = movies
            .iter()
            .map(|m| render::MovieView::new(catalog, m))
            .collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if movies.is_empty() {
        println!("No movies found");
        return Ok(());
    }
    print!("{}", render::movie_table(catalog, &movies));
    Ok(())
}

pub fn show_movie(catalog: &Catalog<SqliteStore>, id: u64, format: &str) -> Result<()> {
    let movie = catalog.movie(id)?;
    let view = render::MovieView::new(catalog, movie);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", view.details());
    }
    Ok(())
}

pub fn add_movie(catalog: &mut Catalog<SqliteStore>, new: NewMovie) -> Result<()> {
    let movie = catalog.add_movie(new)?;
    println!("Added movie {} - {}", movie.id(), movie.title());
    Ok(())
}

pub fn edit_movie(
    catalog: &mut Catalog<SqliteStore>,
    id: u64,
    changes: MovieChanges,
) -> Result<()> {
    if changes.is_empty() {
        println!("Nothing to change for movie {}", id);
        return Ok(());
    }
    let movie = catalog.edit_movie(id, changes)?;
    println!("Updated movie {} - {}", movie.id(), movie.title());
    Ok(())
}

pub fn vote(catalog: &mut Catalog<SqliteStore>, id: u64, score: i64) -> Result<()> {
    let movie = catalog.vote(id, score)?;
    println!(
        "Recorded {} for {}: average {} from {} votes",
        score,
        movie.title(),
        render::rating_label(movie.average_rating()),
        movie.vote_count()
    );
    Ok(())
}

pub fn delete_movie(catalog: &mut Catalog<SqliteStore>, id: u64) -> Result<()> {
    let movie = catalog.delete_movie(id)?;
    println!("Deleted movie {} - {}", movie.id(), movie.title());
    Ok(())
}

// === Maintenance ===

pub fn show_stats(catalog: &Catalog<SqliteStore>, format: &str) -> Result<()> {
    let stats = catalog.stats();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Catalog Statistics:");
    println!("  Movies: {}", stats.total_movies);
    println!("  Genres: {}", stats.total_genres);
    println!("  Votes: {} ({} movies rated)", stats.total_votes, stats.rated_movies);
    if !stats.movies_by_genre.is_empty() {
        println!("  Movies by genre:");
        for (name, count) in &stats.movies_by_genre {
            println!("    {}: {}", name, count);
        }
    }
    Ok(())
}

pub fn reset(db_path: &Path, confirmed: bool) -> Result<()> {
    if !confirmed {
        println!(
            "This deletes every movie and genre in {}. Re-run with --yes to confirm.",
            db_path.display()
        );
        return Ok(());
    }
    let mut catalog = open_catalog(db_path, false)?;
    catalog.reset()?;
    println!("Catalog cleared");
    Ok(())
}
