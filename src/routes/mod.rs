use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::request_id;
use crate::services::providers::SearchProvider;
use crate::services::search::SearchDefaults;

pub mod videos;

/// Shared application state.
///
/// Everything here is immutable after startup; requests carry their own state
/// in the continuation token, so no locking is needed.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn SearchProvider>,
    pub defaults: SearchDefaults,
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/videos.json", get(videos::list))
        .layer(
            TraceLayer::new_for_http().make_span_with(request_id::make_span_with_request_id),
        )
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
