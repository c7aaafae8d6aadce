mod db;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "medloc-cli")]
#[command(about = "Medicine locator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Find nearby stores that stock a medicine
    Search {
        /// Medicine name or generic name to look for
        #[arg(long, short)]
        query: String,
        /// Latitude of the search origin
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude of the search origin
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Search radius in kilometres (defaults to `MEDLOC_SEARCH_DEFAULT_RADIUS_KM`)
        #[arg(long)]
        radius_km: Option<f64>,
        /// Maximum number of results to print
        #[arg(long)]
        limit: Option<usize>,
        /// Record the search against this user id
        #[arg(long)]
        user: Option<Uuid>,
    },
    /// Show a user's recent searches
    History {
        #[arg(long)]
        user: Uuid,
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Load stores and medicines from a YAML seed file
    Seed {
        #[arg(long, default_value = "config/inventory.yaml")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("medloc-cli ready; run with --help for commands");
        return Ok(());
    };

    let config = medloc_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = medloc_db::connect(&config).await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => db::run_ping(&pool).await?,
            DbCommands::Migrate => db::run_migrate(&pool).await?,
            DbCommands::Seed { file } => db::run_seed(&pool, &file).await?,
        },
        Commands::Search {
            query,
            lat,
            lng,
            radius_km,
            limit,
            user,
        } => {
            let request = search::SearchRequest {
                query,
                lat,
                lng,
                radius_km: radius_km.unwrap_or(config.search_default_radius_km),
                limit,
                user,
            };
            search::run_search(pool.clone(), &config, request).await?;
        }
        Commands::History { user, limit } => search::run_history(&pool, user, limit).await?,
    }

    pool.close().await;
    Ok(())
}
