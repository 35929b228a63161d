use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::error;

use crate::archive_store::{ArchiveStore, KindFilter};
use crate::gallery::{FsImageResolver, Gallery, GalleryFilters, DEFAULT_HUE_TOLERANCE};

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;

use super::state::*;
use super::{log_requests, RequestsLoggingLevel, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub records_count: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

/// Query parameters of `GET /images`. Every field is optional; absent or
/// empty values mean "no constraint".
#[derive(Deserialize, Debug)]
struct ImagesQuery {
    min_date: Option<i64>,
    max_date: Option<i64>,
    apply_date: Option<bool>,
    #[serde(rename = "type")]
    kind: Option<String>,
    color: Option<String>,
    hue_tolerance: Option<f64>,
}

impl ImagesQuery {
    fn into_filters(self) -> GalleryFilters {
        GalleryFilters {
            min_date: self.min_date,
            max_date: self.max_date,
            apply_date: self.apply_date.unwrap_or(true),
            kind: self
                .kind
                .filter(|s| !s.is_empty())
                .map(|s| KindFilter::from_param(&s)),
            color: self.color.filter(|s| !s.is_empty()),
            hue_tolerance: self.hue_tolerance.unwrap_or(DEFAULT_HUE_TOLERANCE),
        }
    }
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        records_count: state.store.records_count(),
    };
    Json(stats)
}

async fn get_images(
    State(gallery): State<GuardedGallery>,
    Query(query): Query<ImagesQuery>,
) -> Response {
    match gallery.find(&query.into_filters()) {
        Ok(entries) => Json(entries).into_response(),
        Err(err) => {
            error!("Failed to query gallery: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn image_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Image not found"}))).into_response()
}

async fn get_image(State(state): State<ServerState>, Path(filename): Path<String>) -> Response {
    // Derived filenames never contain path separators; anything with one
    // cannot name a file under the archive root.
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return image_not_found();
    }

    let file_path = state.archive_dir.join(&filename);
    if !file_path.exists() {
        return image_not_found();
    }

    let buffer = match std::fs::read(&file_path) {
        Ok(buffer) => buffer,
        Err(err) => {
            error!("Failed to read image file {:?}: {}", file_path, err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if let Some(kind) = infer::get(&buffer) {
        if kind.mime_type().starts_with("image/") {
            return Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, kind.mime_type().to_string())
                .body(Body::from(buffer))
                .unwrap();
        }
    }
    image_not_found()
}

pub fn make_app(
    config: ServerConfig,
    store: Arc<dyn ArchiveStore>,
    archive_dir: PathBuf,
) -> Router {
    let resolver = Arc::new(FsImageResolver::new(
        archive_dir.clone(),
        &config.public_base_url,
    ));
    let gallery = Arc::new(Gallery::new(store.clone(), resolver));

    let state = ServerState {
        config,
        start_time: Instant::now(),
        store,
        gallery,
        archive_dir,
    };

    Router::new()
        .route("/", get(home))
        .route("/images", get(get_images))
        .route("/image/{filename}", get(get_image))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

pub async fn run_server(
    store: Arc<dyn ArchiveStore>,
    archive_dir: PathBuf,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    public_base_url: String,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
        public_base_url,
    };
    let app = make_app(config, store, archive_dir);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
