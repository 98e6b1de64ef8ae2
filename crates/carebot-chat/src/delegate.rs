//! The general-question delegate seam and its LLM-backed implementation.

use std::sync::Arc;

use async_trait::async_trait;
use carebot_core::{Error, Result};
use parking_lot::RwLock;
use reqwest::Client;
use tracing::{debug, info};

use crate::config::LLMConfig;
use crate::providers::{complete, GenerationParams};
use crate::types::{ChatMessage, DelegateStatus};

pub const HEALTH_CAPABILITY_NOTE: &str =
    "🏥 Need health advice? I can also analyze symptoms and provide medical guidance!";

const SYSTEM_PROMPT: &str = "You are a helpful AI assistant responding to a WhatsApp message. \
Keep your response concise (under 300 words), friendly, and helpful. \
If it's a question, answer it clearly. If it's a request for advice, provide practical suggestions. \
Use emojis sparingly but appropriately to make it friendly for messaging.";

const CONNECTION_PROBE: &str = "Hello! Please respond with 'CareBot delegate is working!'";

/// Answers messages the triage engine does not handle.
#[async_trait]
pub trait GeneralDelegate: Send + Sync {
    /// Full reply text for `message`, addressed to `display_name`.
    async fn answer(&self, message: &str, display_name: &str) -> Result<String>;

    /// Whether a call could be attempted at all.
    fn is_available(&self) -> bool;

    async fn test_connection(&self) -> DelegateStatus;
}

/// Delegate backed by whichever LLM provider the config resolves to.
pub struct LlmDelegate {
    client: Client,
    config: Arc<RwLock<LLMConfig>>,
    params: GenerationParams,
}

impl LlmDelegate {
    pub fn new(config: Arc<RwLock<LLMConfig>>) -> Self {
        Self {
            client: Client::new(),
            config,
            params: GenerationParams::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    async fn ask(&self, prompt: &str) -> Result<String> {
        let resolved = self
            .config
            .read()
            .resolve_provider()
            .ok_or_else(|| Error::Delegate("No LLM provider configured".into()))?;

        debug!("Delegating to {} ({})", resolved.provider, resolved.model);
        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];
        complete(&self.client, &resolved, messages, self.params).await
    }
}

#[async_trait]
impl GeneralDelegate for LlmDelegate {
    async fn answer(&self, message: &str, display_name: &str) -> Result<String> {
        let answer = self.ask(message).await?;
        Ok(format!(
            "Hi {}! {}\n\n{}",
            display_name, answer, HEALTH_CAPABILITY_NOTE
        ))
    }

    fn is_available(&self) -> bool {
        self.config.read().resolve_provider().is_some()
    }

    async fn test_connection(&self) -> DelegateStatus {
        if !self.is_available() {
            return DelegateStatus::error("No LLM provider configured", false);
        }
        match self.ask(CONNECTION_PROBE).await {
            Ok(text) => {
                info!("Delegate connection check succeeded");
                DelegateStatus::success(text)
            }
            Err(e) => DelegateStatus::error(format!("Delegate test failed: {}", e), true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_delegate() {
        let delegate = LlmDelegate::new(Arc::new(RwLock::new(LLMConfig::default())));
        assert!(!delegate.is_available());

        let err = delegate.answer("what's the capital of France?", "Ana").await;
        assert!(matches!(err, Err(Error::Delegate(_))));

        let status = delegate.test_connection().await;
        assert_eq!(status.status, "error");
        assert!(!status.configured);
    }

    #[test]
    fn test_availability_tracks_shared_config() {
        let config = Arc::new(RwLock::new(LLMConfig::default()));
        let delegate = LlmDelegate::new(config.clone());
        assert!(!delegate.is_available());

        config.write().groq_api_key = Some("gsk".into());
        assert!(delegate.is_available());
    }
}
