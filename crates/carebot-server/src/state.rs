//! Shared application state.

use std::sync::Arc;

use carebot_chat::{Assistant, GeneralDelegate, LLMConfig, LlmDelegate};
use carebot_core::CareBotConfig;
use carebot_store::SqliteStore;
use carebot_triage::TriageEngine;
use parking_lot::RwLock;

use crate::bot::Bot;
use crate::twilio::TwilioClient;

/// Everything route handlers need, shared behind one `Arc`.
pub struct AppState {
    pub config: CareBotConfig,
    pub store: Arc<SqliteStore>,
    pub llm_config: Arc<RwLock<LLMConfig>>,
    pub bot: Bot,
    /// `None` when Twilio credentials are incomplete.
    pub twilio: Option<TwilioClient>,
}

impl AppState {
    pub fn new(config: CareBotConfig, store: SqliteStore, llm_config: LLMConfig) -> Self {
        let store = Arc::new(store);
        let llm_config = Arc::new(RwLock::new(llm_config));

        let delegate: Arc<dyn GeneralDelegate> = Arc::new(LlmDelegate::new(llm_config.clone()));
        let assistant = Assistant::new(TriageEngine::new(), Some(delegate));
        let bot = Bot::new(
            store.clone(),
            assistant,
            config.rate_limit,
            config.max_message_length,
        );
        let twilio = config.twilio.clone().map(TwilioClient::new);

        Self {
            config,
            store,
            llm_config,
            bot,
            twilio,
        }
    }
}
