//! Response shape checks across the public HTTP surface.
//!
//! Each test builds a fresh `AppState` over a temporary data directory and
//! drives the router directly; no socket is opened and no LLM key is set.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use carebot_chat::LLMConfig;
use carebot_core::CareBotConfig;
use carebot_server::{build_router, AppState};
use carebot_store::SqliteStore;
use tempfile::TempDir;
use tower::ServiceExt;

fn app_state() -> (Arc<AppState>, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = CareBotConfig::from_lookup(dir.path(), |key| match key {
        "RATE_LIMIT_MAX_CALLS" => Some("3".to_string()),
        _ => None,
    })
    .unwrap();
    let store = SqliteStore::open(&config.data_paths.database).unwrap();
    let llm = LLMConfig::load_with(&config.data_paths.llm_config_file, |_| None);
    (Arc::new(AppState::new(config, store, llm)), dir)
}

async fn call(state: &Arc<AppState>, request: Request<Body>) -> Response {
    build_router(state.clone()).oneshot(request).await.unwrap()
}

async fn text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn json(response: Response) -> serde_json::Value {
    serde_json::from_str(&text(response).await).unwrap()
}

fn webhook(from: &str, body: &str) -> Request<Body> {
    let form = format!(
        "From={}&Body={}",
        from.replace(':', "%3A").replace('+', "%2B"),
        body.replace(' ', "+")
    );
    Request::post("/webhook")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap()
}

/// TwiML envelope: XML declaration, one `<Response>` with one `<Message>`.
#[tokio::test]
async fn test_webhook_twiml_envelope() {
    let (state, _dir) = app_state();
    let response = call(&state, webhook("whatsapp:+15550001111", "I feel slight nausea")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/xml");

    let xml = text(response).await;
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>"));
    assert!(xml.ends_with("</Message></Response>"));
    assert_eq!(xml.matches("<Message>").count(), 1);
    // apostrophes in "I've analyzed" are escaped
    assert!(xml.contains("I&apos;ve analyzed your symptoms."));
    assert!(xml.contains("📊 Severity: Mild"));
}

/// Fourth message inside the window gets the slow-down reply.
#[tokio::test]
async fn test_webhook_rate_limit() {
    let (state, _dir) = app_state();
    for _ in 0..3 {
        call(&state, webhook("+15550002222", "menu")).await;
    }
    let xml = text(call(&state, webhook("+15550002222", "menu")).await).await;
    assert!(xml.contains("slow down"));

    let other = text(call(&state, webhook("+15550003333", "menu")).await).await;
    assert!(other.contains("How I can help you"));
}

/// Stats carry the counters and distributions after real traffic.
#[tokio::test]
async fn test_stats_after_traffic() {
    let (state, _dir) = app_state();
    call(&state, webhook("+15550001111", "I have a severe headache")).await;
    call(&state, webhook("+15550004444", "my dad has chest pain")).await;
    call(&state, webhook("+15550004444", "hello")).await;

    let stats = json(call(&state, Request::get("/stats").body(Body::empty()).unwrap()).await).await;
    for field in [
        "total_users",
        "total_messages",
        "total_analyses",
        "active_users_7d",
        "emergency_count",
        "db_size_mb",
    ] {
        assert!(stats[field].is_number(), "{} should be a number", field);
    }
    assert_eq!(stats["total_users"], 2);
    assert_eq!(stats["total_analyses"], 2);
    assert_eq!(stats["emergency_count"], 1);
    assert_eq!(stats["severity_distribution"]["severe"], 2);
    assert_eq!(stats["urgency_distribution"]["emergency"], 1);
    assert_eq!(stats["urgency_distribution"]["high"], 1);
}

/// Export exposes stored analyses with the flattened analysis fields.
#[tokio::test]
async fn test_export_shape() {
    let (state, _dir) = app_state();
    call(&state, webhook("whatsapp:+15550005555", "I have a cough and a fever")).await;

    let export = json(
        call(
            &state,
            Request::get("/users/%2B15550005555/export")
                .body(Body::empty())
                .unwrap(),
        )
        .await,
    )
    .await;

    assert!(export["exported_at"].is_string());
    assert_eq!(export["user_info"]["total_messages"], 3);
    let analysis = &export["analyses"][0];
    for field in ["symptoms", "recommendations", "potential_conditions"] {
        assert!(analysis[field].is_array(), "{} should be an array", field);
    }
    assert_eq!(analysis["urgency"], "medium");
    assert_eq!(analysis["is_emergency"], false);
    assert!(analysis["confidence"].as_f64().unwrap() <= 0.95);

    let kinds: Vec<&str> = export["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["message_type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["outgoing", "analysis", "incoming"]);
}

#[tokio::test]
async fn test_delete_unknown_user_is_404() {
    let (state, _dir) = app_state();
    let response = call(
        &state,
        Request::delete("/users/%2B19999999999").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(response).await["error"], "User not found");
}

#[tokio::test]
async fn test_llm_config_shape() {
    let (state, _dir) = app_state();
    let config = json(call(&state, Request::get("/llm/config").body(Body::empty()).unwrap()).await).await;
    assert_eq!(config["preferred_provider"], "auto");
    assert_eq!(config["gemini_configured"], false);
    assert!(config["active_provider"].is_null());
    assert!(config["available_models"].as_array().unwrap().is_empty());
}
