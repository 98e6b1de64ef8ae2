//! Transport-side helpers for the messaging channel.
//!
//! Nothing here knows about HTTP or Twilio; these are pure functions and
//! small stateful helpers the server composes.

pub mod chunking;
pub mod metadata;
pub mod ratelimit;
pub mod sanitize;
pub mod text;

pub use chunking::{chunk_message, WHATSAPP_MAX_LENGTH};
pub use metadata::ResponseMetadata;
pub use ratelimit::{Clock, ManualClock, RateLimiter, SystemClock};
pub use sanitize::{anonymize_phone_number, clean_phone_number, sanitize_message, sanitize_phone_number};
pub use text::{
    current_time_greeting, extract_keywords, is_medical_emergency, message_sentiment,
    time_greeting,
};
