//! Emergency fast path.

use crate::knowledge::KnowledgeBase;
use crate::types::{AnalysisResult, Severity, Urgency};

pub const EMERGENCY_SYMPTOM: &str = "emergency situation detected";
pub const EMERGENCY_CONDITION: &str = "medical emergency";
pub const EMERGENCY_CONFIDENCE: f64 = 0.9;

pub const EMERGENCY_RECOMMENDATIONS: &[&str] = &[
    "🚨 EMERGENCY: Call emergency services immediately (911)",
    "If possible, go to the nearest emergency room",
    "Do not drive yourself if experiencing severe symptoms",
    "Stay calm and follow emergency operator instructions",
];

/// True if any emergency phrase occurs in the normalized (lowercased) text.
///
/// Plain substring match: false positives are accepted, false negatives on
/// the phrase list are not.
pub fn is_emergency(kb: &KnowledgeBase, normalized: &str) -> bool {
    kb.emergency_phrases
        .iter()
        .any(|phrase| normalized.contains(phrase))
}

/// The fixed analysis returned whenever the fast path triggers.
pub fn emergency_analysis() -> AnalysisResult {
    AnalysisResult {
        symptoms: vec![EMERGENCY_SYMPTOM.to_string()],
        severity: Severity::Severe,
        urgency: Urgency::Emergency,
        confidence: EMERGENCY_CONFIDENCE,
        recommendations: EMERGENCY_RECOMMENDATIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        potential_conditions: vec![EMERGENCY_CONDITION.to_string()],
        is_emergency: true,
    }
}
