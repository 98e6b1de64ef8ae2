//! Usage statistics.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::error;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/stats", get(get_stats))
}

/// GET /stats: store statistics plus live rate limiter occupancy.
async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.get_statistics() {
        Ok(stats) => {
            let mut body = serde_json::to_value(&stats).unwrap_or_default();
            body["rate_limited_senders"] = serde_json::json!(state.bot.limiter().tracked());
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            error!("Stats error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{body_json, send, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn test_stats_shape() {
        let (state, _dir) = test_state();
        state.bot.process_incoming_message("+1555", "I have a cough").await;

        let request = Request::get("/stats").body(Body::empty()).unwrap();
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["total_users"], 1);
        assert_eq!(json["total_analyses"], 1);
        assert_eq!(json["rate_limited_senders"], 1);
        assert!(json["severity_distribution"].is_object());
        assert!(json["db_size_mb"].is_number());
    }
}
