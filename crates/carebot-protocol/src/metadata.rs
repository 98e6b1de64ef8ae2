//! Per-reply tracking metadata.

use carebot_triage::AnalysisResult;
use serde::Serialize;

use crate::text::{extract_keywords, message_sentiment};

pub const UNKNOWN: &str = "unknown";

/// Summary of a reply for logs and tracking. Replies that did not come from
/// triage carry the defaults: zero confidence, `unknown` labels, zero counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMetadata {
    pub timestamp: String,
    pub confidence: f64,
    pub severity: String,
    pub urgency: String,
    pub num_symptoms: usize,
    pub num_recommendations: usize,
    /// Content words of the inbound message; empty until [`Self::with_message`].
    pub keywords: Vec<String>,
    pub sentiment: f64,
}

impl ResponseMetadata {
    pub fn from_analysis(analysis: Option<&AnalysisResult>) -> Self {
        let timestamp = chrono::Utc::now().to_rfc3339();
        match analysis {
            Some(a) => Self {
                timestamp,
                confidence: a.confidence,
                severity: a.severity.to_string(),
                urgency: a.urgency.to_string(),
                num_symptoms: a.symptoms.len(),
                num_recommendations: a.recommendations.len(),
                keywords: Vec::new(),
                sentiment: 0.0,
            },
            None => Self {
                timestamp,
                confidence: 0.0,
                severity: UNKNOWN.into(),
                urgency: UNKNOWN.into(),
                num_symptoms: 0,
                num_recommendations: 0,
                keywords: Vec::new(),
                sentiment: 0.0,
            },
        }
    }

    /// Attach keyword and sentiment signals of the inbound message.
    pub fn with_message(mut self, message: &str) -> Self {
        self.keywords = extract_keywords(message);
        self.sentiment = message_sentiment(message);
        self
    }
}
