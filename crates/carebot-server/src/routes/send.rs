//! Outbound message route.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use carebot_protocol::sanitize_phone_number;
use carebot_store::MessageType;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/send", post(send_message))
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub to: Option<String>,
    pub message: Option<String>,
}

/// POST /send: push a message to a WhatsApp number.
async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendRequest>,
) -> impl IntoResponse {
    let (Some(to), Some(message)) = (
        req.to.filter(|s| !s.trim().is_empty()),
        req.message.filter(|s| !s.trim().is_empty()),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing to or message parameter" })),
        );
    };

    let Some(twilio) = &state.twilio else {
        warn!("Send requested but Twilio is not configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Twilio is not configured" })),
        );
    };

    match twilio.send_message(&to, &message).await {
        Ok(sids) => {
            let phone = sanitize_phone_number(&to);
            if let Err(e) = state
                .store
                .store_message(&phone, &message, MessageType::Outgoing)
            {
                error!("Failed to log outbound message: {}", e);
            }
            (
                StatusCode::OK,
                Json(json!({ "status": "Message sent successfully", "sids": sids })),
            )
        }
        Err(e) => {
            error!("Send message error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to send message" })),
            )
        }
    }
}
