//! HTTP route handlers.

pub mod llm;
pub mod send;
pub mod stats;
pub mod status;
pub mod users;
pub mod webhook;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(status::routes())
        .merge(webhook::routes())
        .merge(send::routes())
        .merge(stats::routes())
        .merge(users::routes())
        .merge(llm::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
