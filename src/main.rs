mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, GenreCommands, MovieCommands};

// Re-export from lib for internal use
use cmdb::{error, MovieChanges, MovieFilter, NewMovie};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cmdb=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Err(e) if e.is_validation() => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
        other => other.map_err(anyhow::Error::from),
    }
}

fn run(cli: Cli) -> error::Result<()> {
    if let Commands::Reset { yes } = cli.command {
        return cli::reset(&cli.db, yes);
    }

    let mut catalog = cli::open_catalog(&cli.db, !cli.no_seed)?;

    match cli.command {
        Commands::Genres { command } => match command {
            GenreCommands::List { format } => cli::list_genres(&catalog, &format)?,
            GenreCommands::Add { name } => cli::add_genre(&mut catalog, &name)?,
            GenreCommands::Rename { id, name } => cli::rename_genre(&mut catalog, id, &name)?,
            GenreCommands::Delete { id } => cli::delete_genre(&mut catalog, id)?,
        },
        Commands::Movies { command } => match command {
            MovieCommands::List {
                title,
                fuzzy,
                fuzzy_threshold,
                genre,
                min_rating,
                from_year,
                to_year,
                sort,
                limit,
                format,
            } => {
                let filter = MovieFilter {
                    title,
                    fuzzy,
                    fuzzy_threshold,
                    genre_id: genre,
                    min_rating,
                    from_year,
                    to_year,
                    sort,
                    limit,
                };
                cli::list_movies(&catalog, &filter, &format)?;
            }
            MovieCommands::Show { id, format } => cli::show_movie(&catalog, id, &format)?,
            MovieCommands::Add {
                title,
                date,
                popularity,
                genres,
            } => {
                cli::add_movie(
                    &mut catalog,
                    NewMovie {
                        title,
                        release_date: date,
                        popularity,
                        genre_ids: genres,
                    },
                )?;
            }
            MovieCommands::Edit {
                id,
                title,
                date,
                popularity,
                genres,
            } => {
                cli::edit_movie(
                    &mut catalog,
                    id,
                    MovieChanges {
                        title,
                        release_date: date,
                        popularity,
                        genre_ids: genres,
                    },
                )?;
            }
            MovieCommands::Vote { id, score } => cli::vote(&mut catalog, id, score)?,
            MovieCommands::Delete { id } => cli::delete_movie(&mut catalog, id)?,
        },
        Commands::Stats { format } => cli::show_stats(&catalog, &format)?,
        Commands::Reset { .. } => {}
    }

    Ok(())
}
