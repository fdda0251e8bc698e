//! Operational CLI for the GameScout cache store.
//!
//! Runs maintenance tasks against the configured data directory: forcing
//! the legacy import, printing table counts, invalidating a user's cached
//! profile/library, and evicting expired recommendation rows.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use gamescout_store::cache::traits::{LibraryRepository, RecommendationRepository};
use gamescout_store::cache::Store;
use gamescout_store::config;

const TABLES: &[&str] = &[
    "user_profiles",
    "user_games",
    "game_metadata",
    "game_genres",
    "game_tags",
    "recommendations",
    "rec_feedback",
    "game_statuses",
];

#[derive(Parser)]
#[command(name = "storectl", about = "Maintenance commands for the GameScout cache store")]
struct Cli {
    /// Data directory; defaults to the configured location.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import the legacy flat-file status store, if present.
    Migrate,
    /// Print row counts for every cache table.
    Stats,
    /// Drop the cached profile and library for a user to force a resync.
    Invalidate { user_id: String },
    /// Delete expired recommendation rows.
    Evict,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(config::data_dir);
    tracing::info!("Using data directory: {}", data_dir.display());

    let store = Store::new(data_dir);

    match cli.command {
        Command::Migrate => {
            let report = store.ensure_status_migration().await?;
            if report.skipped {
                println!("no legacy status file to import");
            } else {
                println!("imported {} records, discarded {}", report.imported, report.discarded);
            }
        }
        Command::Stats => {
            let db = store.database().await?;
            for table in TABLES {
                let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
                    .fetch_one(db.pool())
                    .await?;
                println!("{table}: {}", row.0);
            }
        }
        Command::Invalidate { user_id } => {
            let library = store.library().await?;
            library.invalidate_user(&user_id).await?;
            println!("invalidated cached profile and library for {user_id}");
        }
        Command::Evict => {
            let recommendations = store.recommendations().await?;
            let evicted = recommendations.evict_expired().await?;
            println!("evicted {evicted} expired recommendation rows");
        }
    }

    Ok(())
}
