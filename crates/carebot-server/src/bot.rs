//! Conversation handling for one inbound message: rate limiting, logging to
//! the store, intent routing, and the assistant call.

use std::sync::Arc;

use carebot_chat::assistant::health_fallback;
use carebot_chat::Assistant;
use carebot_core::{RateLimitConfig, Result};
use carebot_protocol::{
    anonymize_phone_number, clean_phone_number, current_time_greeting, is_medical_emergency,
    sanitize_message, RateLimiter, ResponseMetadata,
};
use carebot_store::{MessageType, SqliteStore};
use carebot_triage::format::DEFAULT_DISPLAY_NAME;
use carebot_triage::AnalysisRecorder;
use tracing::{debug, error, info, warn};

pub const APOLOGY_TEXT: &str =
    "I'm sorry, I encountered an error processing your message. Please try again later.";

pub const RATE_LIMITED_TEXT: &str = "⏳ You're sending messages a little too quickly. \
Please slow down and try again in a minute.\n\nFor medical emergencies, call 911 immediately.";

pub const WELCOME_TEXT: &str = "👋 Welcome to your AI Assistant!

I'm here to help you with:
🩺 Health questions and symptom analysis
🤖 General questions and advice
💡 Tips and guidance on any topic

🔹 Ask me about your health concerns
🔹 Ask me general questions (weather, advice, etc.)
🔹 Type 'help' for more options

⚠️ IMPORTANT: For medical emergencies, call 911 immediately.

How can I help you today?";

pub const HELP_TEXT: &str = "🆘 How I can help you:

1. 🩺 *Health & Medical Questions*
   Describe your symptoms for personalized health guidance

2. 🤖 *General AI Assistant*
   Ask me anything! I can help with advice, questions, explanations, and more

3. 💡 *Health Tips*
   Type 'tips' for general health advice

4. 🚨 *Emergencies*
   For medical emergencies, call 911 immediately

*Example messages:*
• \"I have a headache and feel nauseous\"
• \"Tell me a joke\"
• \"How do I cook pasta?\"
• \"Give me some health tips\"

I can help with both medical and general questions!";

pub const EMERGENCY_CONTACT_TEXT: &str = "🚨 EMERGENCY RESPONSE 🚨

If this is a medical emergency:
📞 Call 911 immediately
🏥 Go to the nearest emergency room

For urgent but non-emergency care:
📞 Call your doctor
🏥 Visit an urgent care center

I'm an AI assistant and cannot provide emergency medical care. Please seek immediate professional help for serious medical situations.

Stay safe! 🙏";

/// Appended when the regex emergency screen fires but triage did not take
/// its emergency path.
pub const EMERGENCY_SCREEN_NOTE: &str =
    "🚨 Some of what you describe can be serious. If this is an emergency, call 911 immediately.";

const LOG_PREVIEW_CHARS: usize = 100;
const MAX_PROFILE_NAME_CHARS: usize = 60;

/// The welcome reply opened with a time-of-day greeting.
pub fn welcome_message(greeting: &str) -> String {
    format!("{}! {}", greeting, WELCOME_TEXT)
}

/// What a message is asking for, decided before any analysis runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Help,
    Tips,
    Emergency,
    Assist,
}

const GREETING_WORDS: &[&str] = &["hi", "hello", "hey", "start"];
const HELP_WORDS: &[&str] = &["help", "menu", "options"];
const TIPS_WORDS: &[&str] = &["tips", "advice"];
const EMERGENCY_WORDS: &[&str] = &["emergency", "911", "urgent"];

/// Route on whole words of the lowercased, trimmed text. Checked in order:
/// greeting, help, tips, emergency, then the assistant.
pub fn route_intent(message: &str) -> Intent {
    let lowered = message.trim().to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    if has_any(&words, GREETING_WORDS) {
        Intent::Greeting
    } else if has_any(&words, HELP_WORDS) {
        Intent::Help
    } else if has_any(&words, TIPS_WORDS) {
        Intent::Tips
    } else if has_any(&words, EMERGENCY_WORDS) {
        Intent::Emergency
    } else {
        Intent::Assist
    }
}

fn has_any(words: &[&str], list: &[&str]) -> bool {
    words.iter().any(|w| list.iter().any(|l| l == w))
}

fn preview(text: &str) -> String {
    if text.chars().count() > LOG_PREVIEW_CHARS {
        let cut: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

pub struct Bot {
    store: Arc<SqliteStore>,
    recorder: Arc<dyn AnalysisRecorder>,
    assistant: Assistant,
    limiter: RateLimiter,
    max_message_length: usize,
}

impl Bot {
    pub fn new(
        store: Arc<SqliteStore>,
        assistant: Assistant,
        rate_limit: RateLimitConfig,
        max_message_length: usize,
    ) -> Self {
        Self {
            recorder: store.clone(),
            store,
            assistant,
            limiter: RateLimiter::new(rate_limit.max_calls, rate_limit.window),
            max_message_length,
        }
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Produce the reply for one inbound message. Never fails: any error
    /// along the way becomes the fixed apology.
    pub async fn process_incoming_message(&self, from: &str, body: &str) -> String {
        self.process_incoming(from, body, None).await
    }

    /// Like [`Self::process_incoming_message`], also recording the sender's
    /// WhatsApp profile name when the channel supplies one.
    pub async fn process_incoming(
        &self,
        from: &str,
        body: &str,
        profile_name: Option<&str>,
    ) -> String {
        match self.try_process(from, body, profile_name).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error processing message: {}", e);
                APOLOGY_TEXT.to_string()
            }
        }
    }

    async fn try_process(
        &self,
        from: &str,
        body: &str,
        profile_name: Option<&str>,
    ) -> Result<String> {
        let phone = clean_phone_number(from);
        let anon = anonymize_phone_number(&phone);

        if !self.limiter.is_allowed(&phone) {
            warn!("Rate limit exceeded for {}", anon);
            self.store.store_message(&phone, body, MessageType::Incoming)?;
            self.store
                .store_message(&phone, RATE_LIMITED_TEXT, MessageType::Outgoing)?;
            return Ok(RATE_LIMITED_TEXT.to_string());
        }

        let message = sanitize_message(body, self.max_message_length);
        info!("Received message from {}: {}", anon, preview(&message));
        self.store
            .store_message(&phone, &message, MessageType::Incoming)?;
        if let Some(name) = profile_name
            .map(|n| sanitize_message(n, MAX_PROFILE_NAME_CHARS))
            .filter(|n| !n.is_empty())
        {
            self.store.set_user_name(&phone, &name)?;
        }

        let reply = self.handle_message(&phone, &message).await?;

        self.store
            .store_message(&phone, &reply, MessageType::Outgoing)?;
        info!("Generated response for {}: {}", anon, preview(&reply));
        Ok(reply)
    }

    async fn handle_message(&self, phone: &str, message: &str) -> Result<String> {
        let intent = route_intent(message);
        debug!("Intent: {:?}", intent);

        Ok(match intent {
            Intent::Greeting => welcome_message(current_time_greeting()),
            Intent::Help => HELP_TEXT.to_string(),
            Intent::Tips => self.health_tips_text(),
            Intent::Emergency => EMERGENCY_CONTACT_TEXT.to_string(),
            Intent::Assist => self.analyze_message(phone, message).await?,
        })
    }

    async fn analyze_message(&self, phone: &str, message: &str) -> Result<String> {
        let name = self
            .store
            .get_user_info(phone)?
            .and_then(|u| u.name)
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());

        let mut reply = self.assistant.respond(message, Some(&name)).await;

        if let Some(analysis) = &reply.analysis {
            if let Err(e) = self.recorder.record_analysis(phone, message, analysis) {
                error!("Failed to record analysis: {}", e);
                return Ok(health_fallback(&name));
            }
        }

        let triage_emergency = reply.analysis.as_ref().is_some_and(|a| a.is_emergency);
        if !triage_emergency && is_medical_emergency(message) {
            warn!("Emergency screen matched for {}", anonymize_phone_number(phone));
            reply.text = format!("{}\n\n{}", reply.text, EMERGENCY_SCREEN_NOTE);
        }

        let meta = ResponseMetadata::from_analysis(reply.analysis.as_ref()).with_message(message);
        debug!(
            "Response metadata: severity={} urgency={} symptoms={} confidence={:.2} \
             sentiment={:.2} keywords={:?}",
            meta.severity,
            meta.urgency,
            meta.num_symptoms,
            meta.confidence,
            meta.sentiment,
            meta.keywords
        );

        self.store.store_message(
            phone,
            &format!("AI Response: {}", preview(&reply.text)),
            MessageType::Analysis,
        )?;

        Ok(reply.text)
    }

    fn health_tips_text(&self) -> String {
        format!(
            "💡 Daily Health Tips:

{}

Remember: Small daily habits make a big difference in your overall health!

Need help with specific symptoms or have other questions? Just ask me anything!",
            self.assistant.health_tips()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebot_triage::TriageEngine;
    use std::time::Duration;

    fn test_bot(max_calls: usize) -> (Bot, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let bot = Bot::new(
            store.clone(),
            Assistant::new(TriageEngine::new(), None),
            RateLimitConfig {
                max_calls,
                window: Duration::from_secs(60),
            },
            1000,
        );
        (bot, store)
    }

    #[test]
    fn test_route_intent() {
        assert_eq!(route_intent("Hi!"), Intent::Greeting);
        assert_eq!(route_intent("  HELLO there"), Intent::Greeting);
        assert_eq!(route_intent("help me please"), Intent::Help);
        assert_eq!(route_intent("any tips?"), Intent::Tips);
        assert_eq!(route_intent("call 911"), Intent::Emergency);
        assert_eq!(route_intent("I have a high fever"), Intent::Assist);
        assert_eq!(route_intent("this thing"), Intent::Assist);
    }

    #[tokio::test]
    async fn test_greeting_is_logged() {
        let (bot, store) = test_bot(10);
        let reply = bot.process_incoming_message("whatsapp:+15550001111", "hello").await;
        assert!(reply.ends_with(WELCOME_TEXT));

        let history = store.get_user_message_history("+15550001111", 10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].message_type, MessageType::Outgoing);
        assert_eq!(history[1].message_body, "hello");
    }

    #[tokio::test]
    async fn test_symptom_message_records_analysis() {
        let (bot, store) = test_bot(10);
        store.get_or_create_user("+15550001111", Some("Ana")).unwrap();

        let reply = bot
            .process_incoming_message("whatsapp:+15550001111", "I have a headache and a fever")
            .await;
        assert!(reply.starts_with("Hi Ana! I've analyzed your symptoms."));

        let analyses = store.get_user_analyses("+15550001111", 10).unwrap();
        assert_eq!(analyses.len(), 1);
        assert!(analyses[0].analysis.symptoms.contains(&"headache".to_string()));

        let history = store.get_user_message_history("+15550001111", 10).unwrap();
        assert!(history
            .iter()
            .any(|m| m.message_type == MessageType::Analysis));
    }

    #[test]
    fn test_welcome_message_greets_by_time() {
        let text = welcome_message(carebot_protocol::time_greeting(9));
        assert!(text.starts_with("Good morning! 👋 Welcome"));
        assert!(welcome_message("Hello").ends_with("How can I help you today?"));
    }

    #[tokio::test]
    async fn test_profile_name_personalizes_reply() {
        let (bot, store) = test_bot(10);
        let reply = bot
            .process_incoming("whatsapp:+15550001111", "I have a fever", Some("Ana"))
            .await;
        assert!(reply.starts_with("Hi Ana! I've analyzed your symptoms."));

        let info = store.get_user_info("+15550001111").unwrap().unwrap();
        assert_eq!(info.name.as_deref(), Some("Ana"));

        // a blank profile name leaves the stored one alone
        bot.process_incoming("whatsapp:+15550001111", "thanks", Some("  "))
            .await;
        let info = store.get_user_info("+15550001111").unwrap().unwrap();
        assert_eq!(info.name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_emergency_screen_adds_note() {
        let (bot, _store) = test_bot(10);
        let reply = bot
            .process_incoming_message("+1555", "I fainted and now I have a headache")
            .await;
        assert!(reply.starts_with("Hi there! I've analyzed your symptoms."));
        assert!(reply.ends_with(EMERGENCY_SCREEN_NOTE));

        // triage already answered with its emergency reply
        let reply = bot
            .process_incoming_message("+1556", "my chest pain is bad")
            .await;
        assert!(!reply.contains(EMERGENCY_SCREEN_NOTE));

        let reply = bot.process_incoming_message("+1557", "I have a mild cough").await;
        assert!(!reply.contains(EMERGENCY_SCREEN_NOTE));
    }

    #[tokio::test]
    async fn test_rate_limited_reply() {
        let (bot, store) = test_bot(1);
        bot.process_incoming_message("+1555", "menu").await;
        let reply = bot.process_incoming_message("+1555", "menu").await;
        assert_eq!(reply, RATE_LIMITED_TEXT);

        let info = store.get_user_info("+1555").unwrap().unwrap();
        assert_eq!(info.total_messages, 4);
    }

    #[tokio::test]
    async fn test_tips_reply() {
        let (bot, _store) = test_bot(10);
        let reply = bot.process_incoming_message("+1555", "tips").await;
        assert!(reply.starts_with("💡 Daily Health Tips:"));
        assert!(reply.contains("Stay hydrated"));
    }
}
