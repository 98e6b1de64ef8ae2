//! Severity scoring.
//!
//! Every indicator phrase found in the text adds its level weight (mild 1,
//! moderate 3, severe 5); all matches accumulate. The symptom count is added
//! last and the total is bucketed into a [`Severity`].

use crate::knowledge::KnowledgeBase;
use crate::types::{Severity, Urgency};

pub const SEVERE_THRESHOLD: u32 = 8;
pub const MODERATE_THRESHOLD: u32 = 4;

/// Raw severity score for a message and its extracted symptoms.
pub fn severity_score(kb: &KnowledgeBase, normalized: &str, symptoms: &[String]) -> u32 {
    let indicator_score: u32 = kb
        .indicator_triples()
        .filter(|(_, _, phrase)| normalized.contains(phrase))
        .map(|(_, level, _)| level.weight())
        .sum();
    indicator_score + symptoms.len() as u32
}

/// Bucket a score: 8+ severe, 4..8 moderate, below 4 mild.
pub fn severity_from_score(score: u32) -> Severity {
    if score >= SEVERE_THRESHOLD {
        Severity::Severe
    } else if score >= MODERATE_THRESHOLD {
        Severity::Moderate
    } else {
        Severity::Mild
    }
}

pub fn assess_severity(kb: &KnowledgeBase, normalized: &str, symptoms: &[String]) -> Severity {
    severity_from_score(severity_score(kb, normalized, symptoms))
}

/// Urgency carries no signal of its own outside the emergency path.
pub fn assess_urgency(severity: Severity) -> Urgency {
    Urgency::from(severity)
}
