//! CareBot Core: configuration, data directories, shared error type.

pub mod config;
pub mod error;

pub use config::{CareBotConfig, DataPaths, RateLimitConfig, TwilioCredentials};
pub use error::{Error, Result};
