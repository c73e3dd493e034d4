// HTTP routes configuration

use super::flash::FlashKey;
use super::handlers::{
    download_handler, health_handler, index_handler, metrics_handler, submit_handler,
};
use super::middleware::request_id_layers;
use super::templates;
use crate::config::AppConfig;
use crate::engines::Engines;
use crate::error::Result;
use crate::storage::FileStore;
use axum::extract::DefaultBodyLimit;
use axum::{routing::get, Router};
use std::sync::Arc;
use tera::Tera;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engines: Arc<Engines>,
    pub store: FileStore,
    pub templates: Arc<Tera>,
    pub flash_key: FlashKey,
}

pub fn create_router(
    config: AppConfig,
    engines: Engines,
    store: FileStore,
    flash_key: FlashKey,
) -> Result<Router> {
    let max_body = config.server.max_upload_mb * 1024 * 1024;

    let state = AppState {
        config: Arc::new(config),
        engines: Arc::new(engines),
        store,
        templates: Arc::new(templates::load()?),
        flash_key,
    };

    let (set_request_id, propagate_request_id) = request_id_layers();

    let app = Router::new()
        .route("/", get(index_handler).post(submit_handler))
        .route("/downloads/:filename", get(download_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        // Enforced while the multipart stream is read so the submit handler can flash it
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state);

    Ok(app)
}
