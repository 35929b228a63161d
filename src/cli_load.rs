//! Offline loader: scans the archive directory and inserts one record per
//! convention-named image file.

use anyhow::Result;
use button_archive_server::archive_store::SqliteArchiveStore;
use button_archive_server::ingest::load_archive_dir;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite image records database file (created if absent).
    pub archive_db: PathBuf,

    /// Path to the directory holding the archived image files.
    pub archive_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let store = SqliteArchiveStore::new(&cli_args.archive_db)?;
    let summary = load_archive_dir(&store, &cli_args.archive_dir)?;

    info!(
        "Archive load complete: {} records inserted, {} files skipped",
        summary.inserted, summary.skipped
    );
    Ok(())
}
