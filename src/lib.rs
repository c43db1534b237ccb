pub mod config;
pub mod db;
pub mod logging;
pub mod response;
pub mod routes;
pub mod seed;
pub mod services;
pub mod srs;
pub mod state;
pub mod workers;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::SrsConfig;
use crate::db::Stores;
use crate::state::AppState;

/// Full HTTP application over the given stores.
pub fn build_app(state: AppState) -> axum::Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// In-memory application with the built-in vocabulary, used by tests and demos.
pub async fn create_app() -> axum::Router {
    let stores = Stores::in_memory();
    if let Err(err) = seed::seed_vocabulary(stores.vocabulary.as_ref()).await {
        tracing::warn!(error = %err, "failed to seed vocabulary");
    }
    build_app(AppState::new(stores, SrsConfig::default()))
}
