//! Service banner, liveness, and the end-to-end self test.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub const SERVICE_NAME: &str = "CareBot WhatsApp Health Assistant";

const SELF_TEST_HEALTH_MESSAGE: &str = "I have a headache";
const SELF_TEST_GENERAL_MESSAGE: &str = "Tell me a joke";
const SELF_TEST_NAME: &str = "TestUser";
const SELF_TEST_PREVIEW_CHARS: usize = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .route("/test", get(self_test))
}

/// GET /
async fn banner() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/webhook", "/send", "/health", "/stats", "/test"],
    }))
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "bot_initialized": true,
    }))
}

fn truncate_preview(text: &str) -> String {
    if text.chars().count() > SELF_TEST_PREVIEW_CHARS {
        let cut: String = text.chars().take(SELF_TEST_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// GET /test: run one health and one general message through the
/// assistant (nothing is stored) and check the delegate connection.
async fn self_test(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let assistant = state.bot.assistant();
    let health = assistant
        .respond(SELF_TEST_HEALTH_MESSAGE, Some(SELF_TEST_NAME))
        .await;
    let general = assistant
        .respond(SELF_TEST_GENERAL_MESSAGE, Some(SELF_TEST_NAME))
        .await;
    let delegate_status = assistant.test_connection().await;
    let llm = state.llm_config.read().to_response();

    Json(json!({
        "status": "success",
        "health_test": truncate_preview(&health.text),
        "general_test": truncate_preview(&general.text),
        "delegate_status": delegate_status,
        "environment": {
            "active_provider": llm.active_provider,
            "twilio_configured": state.twilio.is_some(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{body_json, send, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn test_banner_and_health() {
        let (state, _dir) = test_state();

        let response = send(&state, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert!(json["endpoints"].is_array());

        let response = send(&state, Request::get("/health").body(Body::empty()).unwrap()).await;
        let json = body_json(response).await;
        assert_eq!(json["bot_initialized"], true);
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_self_test_without_delegate() {
        let (state, _dir) = test_state();
        let response = send(&state, Request::get("/test").body(Body::empty()).unwrap()).await;
        let json = body_json(response).await;

        assert_eq!(json["status"], "success");
        assert!(json["health_test"]
            .as_str()
            .unwrap()
            .starts_with("Hi TestUser! I've analyzed your symptoms."));
        assert!(json["general_test"]
            .as_str()
            .unwrap()
            .starts_with("Hi TestUser! I'm currently optimized"));
        assert_eq!(json["delegate_status"]["status"], "error");
        assert_eq!(json["environment"]["twilio_configured"], false);
        assert!(state.store.get_statistics().unwrap().total_messages == 0);
    }
}
