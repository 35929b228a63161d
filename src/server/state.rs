use axum::extract::FromRef;

use crate::archive_store::ArchiveStore;
use crate::gallery::Gallery;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedArchiveStore = Arc<dyn ArchiveStore>;
pub type GuardedGallery = Arc<Gallery>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub store: GuardedArchiveStore,
    pub gallery: GuardedGallery,
    pub archive_dir: PathBuf,
}

impl FromRef<ServerState> for GuardedArchiveStore {
    fn from_ref(input: &ServerState) -> Self {
        input.store.clone()
    }
}

impl FromRef<ServerState> for GuardedGallery {
    fn from_ref(input: &ServerState) -> Self {
        input.gallery.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
