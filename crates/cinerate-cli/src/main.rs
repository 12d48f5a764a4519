use cinerate_config::{Config, PathManager, StorageBackend};
use cinerate_core::{MovieSort, ReviewSort};
use cinerate_models::{MovieId, ReviewId};
use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::eyre;
use commands::{config, movie, reconcile, review, seed, Context};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "cinerate")]
#[command(about = "CineRate - movie catalog with user reviews and ratings")]
#[command(version)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Directory holding the JSON document store (overrides config)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Use a throwaway in-memory store for this invocation
    #[arg(long, global = true, conflicts_with = "data_dir")]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the movie catalog
    Movie {
        #[command(subcommand)]
        cmd: MovieCommands,
    },
    /// Write, edit and like reviews
    Review {
        #[command(subcommand)]
        cmd: ReviewCommands,
    },
    /// Load the bundled starter catalog
    #[command(long_about = "Load the bundled starter catalog. Movies whose title already exists are skipped. With --reset, every movie and review is deleted first.")]
    Seed {
        /// Delete all movies and reviews before seeding
        #[arg(long, action = ArgAction::SetTrue)]
        reset: bool,

        /// Do not ask for confirmation
        #[arg(long, short = 'y', action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Recompute every rating aggregate and drop orphaned reviews
    #[command(long_about = "Rebuild each movie's average rating, rating count and review list from the stored reviews, and delete reviews whose movie no longer exists. Use after an interrupted write.")]
    Reconcile,
    /// Show or initialise the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum MovieCommands {
    /// Add a movie to the catalog
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Release year
        #[arg(long)]
        year: i32,
        #[arg(long)]
        genre: String,
        #[arg(long)]
        director: String,
        /// Comma-separated cast list
        #[arg(long, value_delimiter = ',')]
        cast: Vec<String>,
        /// Poster image URL
        #[arg(long)]
        poster: String,
    },
    /// Edit catalog fields; omitted fields keep their current value
    Edit {
        id: MovieId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        director: Option<String>,
        /// Comma-separated cast list, replaces the current one
        #[arg(long, value_delimiter = ',')]
        cast: Option<Vec<String>>,
        #[arg(long)]
        poster: Option<String>,
    },
    /// Delete a movie together with its reviews
    Rm {
        id: MovieId,
        /// Do not ask for confirmation
        #[arg(long, short = 'y', action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Show a movie and its reviews
    Show { id: MovieId },
    /// List movies
    List {
        /// Only movies of this genre (exact match)
        #[arg(long)]
        genre: Option<String>,
        /// rating, year, title or newest
        #[arg(long, default_value = "newest")]
        sort: MovieSort,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Page size (defaults to catalog.page_size)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List every movie of one genre, by title
    Genre {
        /// Genre name (exact match)
        name: String,
    },
    /// List distinct genres
    Genres,
    /// Import movies from a CSV file
    #[command(long_about = "Import movies from a CSV file with the header: title,description,year,genre,director,cast,poster_url. Cast members are separated by '|'. Invalid rows are reported and skipped.")]
    Import { file: PathBuf },
}

#[derive(Subcommand)]
enum ReviewCommands {
    /// Review a movie (one review per user and movie)
    Add {
        movie_id: MovieId,
        #[arg(long)]
        user: String,
        /// Stars from 1 to 5
        #[arg(long, allow_negative_numbers = true)]
        rating: i64,
        #[arg(long)]
        content: String,
    },
    /// Replace the rating and text of your review
    Edit {
        review_id: ReviewId,
        #[arg(long)]
        user: String,
        #[arg(long, allow_negative_numbers = true)]
        rating: i64,
        #[arg(long)]
        content: String,
    },
    /// Delete your review
    Rm {
        review_id: ReviewId,
        #[arg(long)]
        user: String,
    },
    /// Like a review, or remove your like
    Like {
        review_id: ReviewId,
        #[arg(long)]
        user: String,
    },
    /// Show a single review with its full text
    Show { review_id: ReviewId },
    /// List a movie's reviews
    List {
        movie_id: MovieId,
        /// recent or popular
        #[arg(long, default_value = "recent")]
        sort: ReviewSort,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let output = output::Output::new(cli.output, cli.quiet);

    let paths = PathManager::default();
    let config_file = paths.config_file();
    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    logging::init_logging(
        cli.verbose,
        cli.quiet,
        &config.logging.level,
        config.logging.file.as_deref(),
    )
    .map_err(|e| eyre!("{}", e))?;

    if let Err(report) = run(cli, paths, config, &output).await {
        let code = commands::report_error(&report, &output);
        std::process::exit(code);
    }
    Ok(())
}

async fn run(cli: Cli, paths: PathManager, config: Config, output: &output::Output) -> color_eyre::Result<()> {
    if let Commands::Config { cmd } = cli.command {
        return config::run_config(cmd, &paths, &config, output);
    }

    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration in {}: {}", paths.config_file().display(), e))?;

    let backend = if cli.memory {
        StorageBackend::Memory
    } else {
        config.storage.backend
    };
    let store_dir = cli
        .data_dir
        .or_else(|| config.storage.data_dir.clone())
        .unwrap_or_else(|| paths.store_dir());

    let ctx = Context::open(backend, &store_dir, &config).await?;

    match cli.command {
        Commands::Movie { cmd } => movie::run_movie(cmd, &ctx, output).await,
        Commands::Review { cmd } => review::run_review(cmd, &ctx, output).await,
        Commands::Seed { reset, yes } => seed::run_seed(reset, yes, &ctx, output).await,
        Commands::Reconcile => reconcile::run_reconcile(&ctx, output).await,
        Commands::Config { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_review_add() {
        let movie_id = MovieId::new();
        let id = movie_id.to_string();
        let cli = Cli::try_parse_from([
            "cinerate",
            "--memory",
            "review",
            "add",
            id.as_str(),
            "--user",
            "alice",
            "--rating",
            "4",
            "--content",
            "Great movie, loved it",
        ])
        .unwrap();

        assert!(cli.memory);
        match cli.command {
            Commands::Review {
                cmd: ReviewCommands::Add { movie_id: parsed, rating, .. },
            } => {
                assert_eq!(parsed, movie_id);
                assert_eq!(rating, 4);
            }
            _ => panic!("expected review add"),
        }
    }

    #[test]
    fn test_parse_movie_list_and_cast() {
        let cli = Cli::try_parse_from(["cinerate", "movie", "list", "--sort", "rating", "--page", "2"]).unwrap();
        match cli.command {
            Commands::Movie {
                cmd: MovieCommands::List { sort, page, limit, .. },
            } => {
                assert_eq!(sort, MovieSort::Rating);
                assert_eq!(page, 2);
                assert_eq!(limit, None);
            }
            _ => panic!("expected movie list"),
        }

        let cli = Cli::try_parse_from([
            "cinerate", "movie", "add", "--title", "Heat", "--description", "Cops", "--year", "1995",
            "--genre", "Crime", "--director", "Michael Mann", "--cast", "Al Pacino,Robert De Niro",
            "--poster", "https://example.com/heat.jpg",
        ])
        .unwrap();
        match cli.command {
            Commands::Movie {
                cmd: MovieCommands::Add { cast, .. },
            } => assert_eq!(cast, vec!["Al Pacino", "Robert De Niro"]),
            _ => panic!("expected movie add"),
        }
    }

    #[test]
    fn test_parse_genre_and_review_show() {
        let cli = Cli::try_parse_from(["cinerate", "movie", "genre", "Science Fiction"]).unwrap();
        match cli.command {
            Commands::Movie {
                cmd: MovieCommands::Genre { name },
            } => assert_eq!(name, "Science Fiction"),
            _ => panic!("expected movie genre"),
        }

        let review_id = ReviewId::new();
        let id = review_id.to_string();
        let cli = Cli::try_parse_from(["cinerate", "review", "show", id.as_str()]).unwrap();
        match cli.command {
            Commands::Review {
                cmd: ReviewCommands::Show { review_id: parsed },
            } => assert_eq!(parsed, review_id),
            _ => panic!("expected review show"),
        }
    }

    #[test]
    fn test_rejects_bad_ids_and_sorts() {
        assert!(Cli::try_parse_from(["cinerate", "movie", "show", "not-a-uuid"]).is_err());
        let id = MovieId::new().to_string();
        assert!(Cli::try_parse_from(["cinerate", "review", "list", id.as_str(), "--sort", "loud"]).is_err());
        assert!(Cli::try_parse_from(["cinerate", "--memory", "--data-dir", "/tmp/x", "reconcile"]).is_err());
    }
}
