//! General-question delegate with external LLM calls (Gemini/OpenAI/Anthropic/Groq).
//!
//! Health-related messages are answered by the deterministic triage engine;
//! everything else goes to a [`GeneralDelegate`] with fixed fallback text
//! when no provider is configured or the call fails.

pub mod assistant;
pub mod config;
pub mod delegate;
pub mod providers;
pub mod types;

pub use assistant::Assistant;
pub use config::LLMConfig;
pub use delegate::{GeneralDelegate, LlmDelegate};
pub use types::*;
