//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own SQLite database and
//! archive directory, bound to a random port.

use button_archive_server::archive_store::{ArchiveStore, NewImageRecord, SqliteArchiveStore};
use button_archive_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use image::{ImageFormat, Rgb, RgbImage};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

const SERVER_READY_TIMEOUT_MS: u64 = 5000;
const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Test server instance with an isolated database and archive directory.
///
/// When dropped, the server gracefully shuts down and temp resources are
/// cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Store handle for seeding records directly in tests
    pub store: Arc<SqliteArchiveStore>,

    /// Directory the server resolves image files from
    pub archive_dir: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port and waits for it to be
    /// ready.
    pub async fn spawn() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let archive_dir = temp_dir.path().join("archive");
        std::fs::create_dir(&archive_dir).expect("Failed to create archive dir");

        let store = Arc::new(
            SqliteArchiveStore::new(temp_dir.path().join("images.db"))
                .expect("Failed to open archive store"),
        );

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            public_base_url: base_url.clone(),
        };
        let app = make_app(
            config,
            store.clone() as Arc<dyn ArchiveStore>,
            archive_dir.clone(),
        );

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            store,
            archive_dir,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Insert a record directly through the store, returning its row id.
    pub fn insert_record(&self, record: &NewImageRecord) -> i64 {
        self.store
            .insert_record(record)
            .expect("Failed to insert record")
    }

    /// Write a solid-color image into the archive directory. Always PNG
    /// bytes, whatever the extension says; the server sniffs content.
    pub fn write_archive_png(&self, filename: &str, rgb: [u8; 3]) {
        RgbImage::from_pixel(8, 8, Rgb(rgb))
            .save_with_format(self.archive_dir.join(filename), ImageFormat::Png)
            .expect("Failed to write test image");
    }

    /// Waits for the server to become ready by polling the stats endpoint.
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
