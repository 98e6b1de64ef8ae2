//! Provider identifiers and request/response shapes for the delegate.

use serde::{Deserialize, Serialize};

/// External LLM provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    Gemini,
    OpenAI,
    Anthropic,
    Groq,
}

impl LLMProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LLMProvider::Gemini => "gemini",
            LLMProvider::OpenAI => "openai",
            LLMProvider::Anthropic => "anthropic",
            LLMProvider::Groq => "groq",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gemini" => Some(LLMProvider::Gemini),
            "openai" => Some(LLMProvider::OpenAI),
            "anthropic" => Some(LLMProvider::Anthropic),
            "groq" => Some(LLMProvider::Groq),
            _ => None,
        }
    }
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Result of a delegate connection check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegateStatus {
    /// `success` or `error`.
    pub status: String,
    pub message: String,
    pub configured: bool,
}

impl DelegateStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".into(),
            message: message.into(),
            configured: true,
        }
    }

    pub fn error(message: impl Into<String>, configured: bool) -> Self {
        Self {
            status: "error".into(),
            message: message.into(),
            configured,
        }
    }
}

/// LLM config as exposed over HTTP (keys masked).
#[derive(Debug, Clone, Serialize)]
pub struct LLMConfigResponse {
    pub preferred_provider: String,
    pub gemini_configured: bool,
    pub openai_configured: bool,
    pub anthropic_configured: bool,
    pub groq_configured: bool,
    pub gemini_model: String,
    pub openai_model: String,
    pub anthropic_model: String,
    pub groq_model: String,
    pub active_provider: Option<String>,
    pub available_models: Vec<String>,
}

/// Partial update of the LLM config. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LLMConfigUpdate {
    pub preferred_provider: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub openai_model: Option<String>,
    pub anthropic_model: Option<String>,
    pub groq_model: Option<String>,
}

/// API key validation request.
#[derive(Debug, Clone, Deserialize)]
pub struct TestKeyRequest {
    pub provider: String,
    pub api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse_roundtrip() {
        for p in [
            LLMProvider::Gemini,
            LLMProvider::OpenAI,
            LLMProvider::Anthropic,
            LLMProvider::Groq,
        ] {
            assert_eq!(LLMProvider::parse(p.as_str()), Some(p));
        }
        assert_eq!(LLMProvider::parse("ollama"), None);
    }

    #[test]
    fn test_delegate_status_shape() {
        let json = serde_json::to_value(DelegateStatus::error("not configured", false)).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["configured"], false);
    }
}
