//! psynth-ws library - legacy Photosynth collection upload service
//!
//! Emulates the retired Photosynth upload endpoints: a synther client
//! creates a collection over SOAP-style calls, registers photos, uploads
//! zipped bundles for each photo plus the point-cloud and deep-zoom
//! aggregates, then commits; the service assembles everything into one
//! archive with descriptor metadata.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;

pub mod api;
pub mod archive;
pub mod descriptor;
pub mod error;
pub mod manifest;
pub mod packager;
pub mod photos;
pub mod session;
pub mod staging;

use archive::{Archiver, ZipArchiver};
use session::SessionRegistry;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single process-wide session slot
    pub registry: Arc<SessionRegistry>,
    /// Archive handling, swappable in tests
    pub archiver: Arc<dyn Archiver>,
}

impl AppState {
    /// Create application state rooted at `output_root`
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new(output_root)),
            archiver: Arc::new(ZipArchiver),
        }
    }

    /// Substitute the archiver implementation
    pub fn with_archiver(mut self, archiver: Arc<dyn Archiver>) -> Self {
        self.archiver = archiver;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};
    use tower_http::trace::TraceLayer;

    Router::new()
        .route(
            "/photosynthws/PhotosynthService.asmx",
            post(api::service_endpoint),
        )
        .route("/photosynthws/upload.ashx", post(api::upload))
        .route("/edit/:session_id", get(api::edit_page))
        .merge(api::health_routes())
        .fallback(api::fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
