//! Message router: health questions to triage, everything else to the
//! general delegate.

use std::sync::Arc;

use carebot_triage::format::display_name;
use carebot_triage::tips::health_tips_text;
use carebot_triage::{is_health_related, AnalysisResult, TriageEngine};
use tracing::{debug, warn};

use crate::delegate::GeneralDelegate;
use crate::types::DelegateStatus;

pub const GENERAL_HELP_NOTE: &str =
    "💡 I can also help with general questions, advice, or any other topics!";

/// What the assistant said, plus the analysis when triage produced it.
#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub text: String,
    pub analysis: Option<AnalysisResult>,
}

pub struct Assistant {
    engine: TriageEngine,
    delegate: Option<Arc<dyn GeneralDelegate>>,
}

impl Assistant {
    pub fn new(engine: TriageEngine, delegate: Option<Arc<dyn GeneralDelegate>>) -> Self {
        Self { engine, delegate }
    }

    pub fn engine(&self) -> &TriageEngine {
        &self.engine
    }

    fn delegate_available(&self) -> bool {
        self.delegate.as_ref().is_some_and(|d| d.is_available())
    }

    /// Answer one message. Never fails: delegate problems degrade to the
    /// general fallback text.
    pub async fn respond(&self, message: &str, name: Option<&str>) -> AssistantReply {
        let name = display_name(name);

        if is_health_related(message) {
            debug!("Routing to triage");
            let (analysis, mut text) = self.engine.respond(message, Some(name));
            if self.delegate_available() {
                text.push_str("\n\n");
                text.push_str(GENERAL_HELP_NOTE);
            }
            return AssistantReply {
                text,
                analysis: Some(analysis),
            };
        }

        let text = match &self.delegate {
            Some(delegate) if delegate.is_available() => {
                match delegate.answer(message, name).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("General delegate failed: {}", e);
                        general_fallback(name)
                    }
                }
            }
            _ => {
                debug!("No general delegate available, using fallback");
                general_fallback(name)
            }
        };

        AssistantReply {
            text,
            analysis: None,
        }
    }

    pub fn health_tips(&self) -> String {
        health_tips_text()
    }

    pub async fn test_connection(&self) -> DelegateStatus {
        match &self.delegate {
            Some(delegate) => delegate.test_connection().await,
            None => DelegateStatus::error("General-question delegate not available", false),
        }
    }
}

/// Reply used when symptom analysis itself could not run.
pub fn health_fallback(name: &str) -> String {
    format!(
        "Hi {}! I'm having trouble analyzing your symptoms right now.

🏥 For health concerns, I recommend:
• Consulting with a healthcare professional
• Calling your doctor if symptoms are concerning
• Visiting urgent care for serious issues
• Calling 911 for emergencies

💡 You can also try rephrasing your question and I'll do my best to help!",
        name
    )
}

/// Reply for non-health messages when no delegate can answer.
pub fn general_fallback(name: &str) -> String {
    format!(
        "Hi {}! I'm currently optimized for health and medical questions.

🏥 I can help you with:
• Symptom analysis
• Health recommendations
• Medical advice and guidance
• Emergency situation assessment

💡 Try asking me about any health concerns you might have!

⚠️ For other topics, I'm still learning. My AI capabilities are expanding soon!",
        name
    )
}
