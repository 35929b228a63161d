use anyhow::{Context, Result};
use button_archive_server::archive_store::SqliteArchiveStore;
use button_archive_server::server::{run_server, RequestsLoggingLevel};
use button_archive_server::ArchiveStore;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite image records database file.
    #[clap(value_parser = parse_path)]
    pub archive_db: PathBuf,

    /// Path to the directory holding the archived image files.
    #[clap(value_parser = parse_path)]
    pub archive_dir: PathBuf,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8000)]
    pub port: u16,

    /// Public base URL used to build image links. Defaults to
    /// http://127.0.0.1:<port>.
    #[clap(long)]
    pub public_base_url: Option<String>,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,
}

#[tokio::main]
async fn main() -> Result<()> {
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

    info!(
        "Opening SQLite archive database at {:?}...",
        cli_args.archive_db
    );
    let store: Arc<dyn ArchiveStore> = Arc::new(SqliteArchiveStore::new(&cli_args.archive_db)?);
    info!("Opened image archive: {} records", store.records_count());

    let public_base_url = cli_args
        .public_base_url
        .unwrap_or_else(|| format!("http://127.0.0.1:{}", cli_args.port));

    info!("Ready to serve at port {}!", cli_args.port);
    run_server(
        store,
        cli_args.archive_dir,
        cli_args.logging_level,
        cli_args.port,
        public_base_url,
    )
    .await
}
