//! Button Archive Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod archive_store;
pub mod color;
pub mod gallery;
pub mod ingest;
pub mod metadata;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use archive_store::{ArchiveStore, SqliteArchiveStore};
pub use gallery::{FsImageResolver, Gallery, GalleryFilters, ImageResolver};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
