//! Twilio WhatsApp webhook: form in, TwiML out.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Json, Router};
use serde::Deserialize;
use tracing::{error, warn};

use crate::state::AppState;

pub const TECHNICAL_DIFFICULTIES_TEXT: &str =
    "I'm sorry, I'm experiencing technical difficulties. Please try again later.";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhook", post(webhook))
}

/// The fields of Twilio's inbound message form this service uses.
#[derive(Debug, Deserialize)]
pub struct WebhookForm {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
    /// WhatsApp display name of the sender, when shared.
    #[serde(rename = "ProfileName", default)]
    pub profile_name: String,
}

/// POST /webhook
async fn webhook(State(state): State<Arc<AppState>>, Form(form): Form<WebhookForm>) -> Response {
    if form.from.trim().is_empty() || form.body.trim().is_empty() {
        warn!("Received webhook with missing data");
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Missing required data" })),
        )
            .into_response();
    }

    // Run on its own task so a panic anywhere below still gets a TwiML reply.
    let task_state = state.clone();
    let outcome = tokio::spawn(async move {
        let profile_name = Some(form.profile_name.as_str()).filter(|n| !n.trim().is_empty());
        task_state
            .bot
            .process_incoming(&form.from, &form.body, profile_name)
            .await
    })
    .await;

    match outcome {
        Ok(reply) => twiml_message(&reply),
        Err(e) => {
            error!("Webhook error: {}", e);
            twiml_message(TECHNICAL_DIFFICULTIES_TEXT)
        }
    }
}

/// A TwiML document replying with one message.
pub fn twiml_message(text: &str) -> Response {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape_xml(text)
    );
    ([(header::CONTENT_TYPE, "text/xml")], body).into_response()
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::WELCOME_TEXT;
    use crate::routes::test_support::{body_json, body_text, send, test_state};
    use axum::body::Body;
    use axum::http::Request;

    fn form_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(escape_xml("I'm"), "I&apos;m");
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let (state, _dir) = test_state();
        let response = send(&state, form_request("From=whatsapp%3A%2B15550001111")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Missing required data");
    }

    #[tokio::test]
    async fn test_greeting_returns_twiml() {
        let (state, _dir) = test_state();
        let response = send(
            &state,
            form_request("From=whatsapp%3A%2B15550001111&Body=hello&MessageSid=SM1"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/xml");

        let xml = body_text(response).await;
        assert!(xml.contains("<Response><Message>"));
        assert!(xml.contains(&escape_xml(WELCOME_TEXT)));

        let info = state.store.get_user_info("+15550001111").unwrap().unwrap();
        assert_eq!(info.total_messages, 2);
    }

    #[tokio::test]
    async fn test_profile_name_greets_sender() {
        let (state, _dir) = test_state();
        let response = send(
            &state,
            form_request("From=whatsapp%3A%2B15550001111&Body=I+have+a+fever&ProfileName=Ana"),
        )
        .await;
        let xml = body_text(response).await;
        assert!(xml.contains("Hi Ana! I&apos;ve analyzed your symptoms."));

        let info = state.store.get_user_info("+15550001111").unwrap().unwrap();
        assert_eq!(info.name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_emergency_symptom_gets_notice() {
        let (state, _dir) = test_state();
        let response = send(
            &state,
            form_request("From=%2B15550001111&Body=my+chest+pain+is+getting+worse"),
        )
        .await;
        let xml = body_text(response).await;
        assert!(xml.contains("EMERGENCY DETECTED"));

        let analyses = state.store.get_user_analyses("+15550001111", 10).unwrap();
        assert!(analyses[0].analysis.is_emergency);
    }
}
