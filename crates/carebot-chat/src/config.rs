//! LLM configuration persistence and provider selection.

use std::path::{Path, PathBuf};

use carebot_core::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{LLMConfigResponse, LLMConfigUpdate, LLMProvider};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

pub const GEMINI_MODELS: &[&str] = &["gemini-1.5-flash", "gemini-1.5-pro", "gemini-2.0-flash"];
pub const OPENAI_MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini", "gpt-3.5-turbo"];
pub const ANTHROPIC_MODELS: &[&str] = &["claude-3-5-haiku-20241022", "claude-3-5-sonnet-20241022"];
pub const GROQ_MODELS: &[&str] = &["llama-3.3-70b-versatile", "llama-3.1-8b-instant"];

/// Stored LLM configuration (persisted to llm-config.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    #[serde(default = "default_preferred")]
    pub preferred_provider: String,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_preferred() -> String {
    "auto".into()
}
fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.into()
}
fn default_groq_model() -> String {
    DEFAULT_GROQ_MODEL.into()
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            preferred_provider: default_preferred(),
            gemini_api_key: None,
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            gemini_model: default_gemini_model(),
            openai_model: default_openai_model(),
            anthropic_model: default_anthropic_model(),
            groq_model: default_groq_model(),
            config_path: PathBuf::new(),
        }
    }
}

/// A resolved provider: which API, which model, which key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    pub provider: LLMProvider,
    pub model: String,
    pub api_key: String,
}

impl LLMConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Like [`LLMConfig::load`] with an injectable variable lookup.
    pub fn load_with<F>(config_path: &Path, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: LLMConfig = std::fs::read_to_string(config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        config.config_path = config_path.to_path_buf();

        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if config.gemini_api_key.is_none() {
            config.gemini_api_key = non_empty("GEMINI_API_KEY");
        }
        if config.openai_api_key.is_none() {
            config.openai_api_key = non_empty("OPENAI_API_KEY");
        }
        if config.anthropic_api_key.is_none() {
            config.anthropic_api_key = non_empty("ANTHROPIC_API_KEY");
        }
        if config.groq_api_key.is_none() {
            config.groq_api_key = non_empty("GROQ_API_KEY");
        }

        config
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.config_path, json)?;
        info!("Saved LLM config to {}", self.config_path.display());
        Ok(())
    }

    /// Merge an update into this config.
    pub fn apply_update(&mut self, update: &LLMConfigUpdate) {
        let set = |slot: &mut Option<String>, value: &Option<String>| {
            if let Some(v) = value {
                *slot = Some(v.clone());
            }
        };
        set(&mut self.gemini_api_key, &update.gemini_api_key);
        set(&mut self.openai_api_key, &update.openai_api_key);
        set(&mut self.anthropic_api_key, &update.anthropic_api_key);
        set(&mut self.groq_api_key, &update.groq_api_key);

        if let Some(p) = &update.preferred_provider {
            self.preferred_provider = p.clone();
        }
        if let Some(m) = &update.gemini_model {
            self.gemini_model = m.clone();
        }
        if let Some(m) = &update.openai_model {
            self.openai_model = m.clone();
        }
        if let Some(m) = &update.anthropic_model {
            self.anthropic_model = m.clone();
        }
        if let Some(m) = &update.groq_model {
            self.groq_model = m.clone();
        }
    }

    fn provider_entry(&self, provider: LLMProvider) -> Option<ResolvedProvider> {
        let (key, model) = match provider {
            LLMProvider::Gemini => (&self.gemini_api_key, &self.gemini_model),
            LLMProvider::OpenAI => (&self.openai_api_key, &self.openai_model),
            LLMProvider::Anthropic => (&self.anthropic_api_key, &self.anthropic_model),
            LLMProvider::Groq => (&self.groq_api_key, &self.groq_model),
        };
        key.as_ref().map(|k| ResolvedProvider {
            provider,
            model: model.clone(),
            api_key: k.clone(),
        })
    }

    /// Resolve which provider and model to use.
    pub fn resolve_provider(&self) -> Option<ResolvedProvider> {
        if self.preferred_provider != "auto" {
            return LLMProvider::parse(&self.preferred_provider)
                .and_then(|p| self.provider_entry(p));
        }

        // Auto mode: Gemini > Anthropic > Groq > OpenAI
        [
            LLMProvider::Gemini,
            LLMProvider::Anthropic,
            LLMProvider::Groq,
            LLMProvider::OpenAI,
        ]
        .into_iter()
        .find_map(|p| self.provider_entry(p))
    }

    /// Public view of the config, without API keys.
    pub fn to_response(&self) -> LLMConfigResponse {
        LLMConfigResponse {
            preferred_provider: self.preferred_provider.clone(),
            gemini_configured: self.gemini_api_key.is_some(),
            openai_configured: self.openai_api_key.is_some(),
            anthropic_configured: self.anthropic_api_key.is_some(),
            groq_configured: self.groq_api_key.is_some(),
            gemini_model: self.gemini_model.clone(),
            openai_model: self.openai_model.clone(),
            anthropic_model: self.anthropic_model.clone(),
            groq_model: self.groq_model.clone(),
            active_provider: self.resolve_provider().map(|r| r.provider.to_string()),
            available_models: self.available_models(),
        }
    }

    /// Models offered for the active provider.
    pub fn available_models(&self) -> Vec<String> {
        let models: &[&str] = match self.resolve_provider().map(|r| r.provider) {
            Some(LLMProvider::Gemini) => GEMINI_MODELS,
            Some(LLMProvider::OpenAI) => OPENAI_MODELS,
            Some(LLMProvider::Anthropic) => ANTHROPIC_MODELS,
            Some(LLMProvider::Groq) => GROQ_MODELS,
            None => &[],
        };
        models.iter().map(|s| s.to_string()).collect()
    }
}
