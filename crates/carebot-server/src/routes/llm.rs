//! General-question delegate configuration.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use carebot_chat::providers;
use carebot_chat::types::{LLMConfigUpdate, TestKeyRequest};
use serde_json::json;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/llm/config", get(get_config).put(update_config))
        .route("/llm/config/test", post(test_key))
}

/// GET /llm/config: keys are never returned.
async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = state.llm_config.read().to_response();
    Json(response)
}

/// PUT /llm/config
async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<LLMConfigUpdate>,
) -> impl IntoResponse {
    let mut config = state.llm_config.write();
    config.apply_update(&update);

    if let Err(e) = config.save() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to save config: {}", e) })),
        );
    }

    (
        StatusCode::OK,
        Json(serde_json::to_value(config.to_response()).unwrap_or_default()),
    )
}

/// POST /llm/config/test
async fn test_key(Json(req): Json<TestKeyRequest>) -> impl IntoResponse {
    match providers::test_api_key(&req.provider, &req.api_key).await {
        Ok(()) => Json(json!({ "success": true })),
        Err(e) => Json(json!({ "success": false, "error": e.to_string() })),
    }
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{body_json, send, test_state};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};

    #[tokio::test]
    async fn test_update_persists_and_masks_keys() {
        let (state, _dir) = test_state();
        let request = Request::put("/llm/config")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"gemini_api_key": "AIza-secret"}"#))
            .unwrap();
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["gemini_configured"], true);
        assert_eq!(json["active_provider"], "gemini");
        assert!(!json.to_string().contains("AIza-secret"));

        assert!(state.config.data_paths.llm_config_file.exists());
    }

    #[tokio::test]
    async fn test_unknown_provider_key_test() {
        let (state, _dir) = test_state();
        let request = Request::post("/llm/config/test")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"provider": "ollama", "api_key": "x"}"#))
            .unwrap();
        let json = body_json(send(&state, request).await).await;
        assert_eq!(json["success"], false);
    }
}
