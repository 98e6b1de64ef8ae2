//! Per-user data export and erasure.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use carebot_protocol::{anonymize_phone_number, clean_phone_number};
use serde_json::json;
use tracing::{error, info};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/{phone}/export", get(export_user))
        .route("/users/{phone}", axum::routing::delete(delete_user))
}

fn internal_error(e: carebot_core::Error) -> (StatusCode, Json<serde_json::Value>) {
    error!("User data request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}

fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "User not found" })))
}

/// GET /users/{phone}/export
async fn export_user(
    State(state): State<Arc<AppState>>,
    Path(phone): Path<String>,
) -> impl IntoResponse {
    let phone = clean_phone_number(&phone);
    match state.store.export_user_data(&phone) {
        Ok(Some(export)) => (
            StatusCode::OK,
            Json(serde_json::to_value(&export).unwrap_or_default()),
        ),
        Ok(None) => not_found(),
        Err(e) => internal_error(e),
    }
}

/// DELETE /users/{phone}
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(phone): Path<String>,
) -> impl IntoResponse {
    let phone = clean_phone_number(&phone);
    match state.store.delete_user_data(&phone) {
        Ok(true) => {
            info!("Erased data for {}", anonymize_phone_number(&phone));
            (StatusCode::OK, Json(json!({ "deleted": true })))
        }
        Ok(false) => not_found(),
        Err(e) => internal_error(e),
    }
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{body_json, send, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn test_export_then_delete() {
        let (state, _dir) = test_state();
        state
            .bot
            .process_incoming_message("whatsapp:+15550001111", "my stomach hurts")
            .await;

        let request = Request::get("/users/%2B15550001111/export")
            .body(Body::empty())
            .unwrap();
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["user_info"]["phone_number"], "+15550001111");
        assert_eq!(json["analyses"].as_array().unwrap().len(), 1);
        assert!(json["analyses"][0]["severity"].is_string());

        let request = Request::delete("/users/%2B15550001111")
            .body(Body::empty())
            .unwrap();
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let request = Request::get("/users/%2B15550001111/export")
            .body(Body::empty())
            .unwrap();
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
