//! Row types for users, messages, analyses and store statistics.

use std::collections::BTreeMap;

use carebot_triage::AnalysisResult;
use serde::{Deserialize, Serialize};

/// Direction/kind of a logged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Incoming,
    Outgoing,
    Analysis,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
            Self::Analysis => "analysis",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "incoming" => Some(Self::Incoming),
            "outgoing" => Some(Self::Outgoing),
            "analysis" => Some(Self::Analysis),
            _ => None,
        }
    }
}

/// A user row. Timestamps are Unix milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: i64,
    pub last_active: i64,
    pub total_messages: i64,
}

/// A logged message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: i64,
    pub phone_number: String,
    pub message_body: String,
    pub message_type: MessageType,
    pub timestamp: i64,
}

/// A stored triage analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub id: i64,
    pub phone_number: String,
    pub original_message: String,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub timestamp: i64,
}

/// Aggregate usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_users: i64,
    pub total_messages: i64,
    pub total_analyses: i64,
    pub active_users_7d: i64,
    pub emergency_count: i64,
    pub severity_distribution: BTreeMap<String, i64>,
    pub urgency_distribution: BTreeMap<String, i64>,
    pub db_path: String,
    pub db_size_mb: f64,
    pub generated_at: String,
}

/// Rows removed by a retention pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub messages_deleted: usize,
    pub analyses_deleted: usize,
}

/// Everything stored about one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserExport {
    pub user_info: UserInfo,
    pub messages: Vec<StoredMessage>,
    pub analyses: Vec<StoredAnalysis>,
    pub exported_at: String,
}
