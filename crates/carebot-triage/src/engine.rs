//! Triage engine: wires the pipeline stages over one knowledge base.

use std::sync::Arc;

use tracing::debug;

use crate::compose::{generate_recommendations, identify_conditions};
use crate::confidence::calculate_confidence;
use crate::emergency::{emergency_analysis, is_emergency};
use crate::extract::extract_symptoms;
use crate::format::format_response;
use crate::knowledge::KnowledgeBase;
use crate::scoring::{assess_severity, assess_urgency};
use crate::types::AnalysisResult;

/// Persistence hook for finished analyses. The engine never reads them back.
pub trait AnalysisRecorder: Send + Sync {
    fn record_analysis(
        &self,
        user_key: &str,
        original_message: &str,
        analysis: &AnalysisResult,
    ) -> carebot_core::Result<()>;
}

/// Stateless triage over an immutable knowledge base. Cheap to clone and
/// safe to share across requests.
#[derive(Debug, Clone)]
pub struct TriageEngine {
    kb: Arc<KnowledgeBase>,
}

impl TriageEngine {
    /// Engine over the built-in knowledge base.
    pub fn new() -> Self {
        Self::with_knowledge(KnowledgeBase::shared().clone())
    }

    pub fn with_knowledge(kb: KnowledgeBase) -> Self {
        Self { kb: Arc::new(kb) }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Analyze a raw message. Never fails; empty input is a zero-symptom,
    /// mild analysis.
    pub fn analyze(&self, message: &str) -> AnalysisResult {
        let normalized = message.to_lowercase();
        let normalized = normalized.trim();

        if is_emergency(&self.kb, normalized) {
            debug!("Emergency phrase detected, skipping scoring");
            return emergency_analysis();
        }

        let symptoms = extract_symptoms(&self.kb, normalized);
        let severity = assess_severity(&self.kb, normalized, &symptoms);
        let urgency = assess_urgency(severity);
        let recommendations = generate_recommendations(&self.kb, &symptoms, severity);
        let potential_conditions = identify_conditions(&self.kb, &symptoms);
        let confidence = calculate_confidence(symptoms.len(), normalized);

        debug!(
            "Triage: {} symptoms, severity={}, conditions={}",
            symptoms.len(),
            severity,
            potential_conditions.len()
        );

        AnalysisResult {
            symptoms,
            severity,
            urgency,
            confidence,
            recommendations,
            potential_conditions,
            is_emergency: false,
        }
    }

    pub fn format_response(&self, analysis: &AnalysisResult, display_name: Option<&str>) -> String {
        format_response(analysis, display_name)
    }

    /// Analyze and render in one step.
    pub fn respond(&self, message: &str, display_name: Option<&str>) -> (AnalysisResult, String) {
        let analysis = self.analyze(message);
        let text = format_response(&analysis, display_name);
        (analysis, text)
    }
}

impl Default for TriageEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Severity, Urgency};

    #[test]
    fn test_severe_headache_and_fever() {
        let engine = TriageEngine::new();
        let analysis = engine.analyze("I have a severe headache and fever");
        assert!(analysis.symptoms.contains(&"headache".to_string()));
        assert!(analysis.symptoms.contains(&"fever".to_string()));
        assert!(analysis
            .symptoms
            .contains(&"a severe headache and fever".to_string()));
        assert!(analysis.severity >= Severity::Moderate);
        assert!(!analysis.potential_conditions.contains(&"Flu".to_string()));
        assert!(!analysis.is_emergency);
    }

    #[test]
    fn test_chest_pain_fast_path() {
        let engine = TriageEngine::new();
        let analysis = engine.analyze("Mild CHEST PAIN after a slight cough, nothing else");
        assert!(analysis.is_emergency);
        assert_eq!(analysis.urgency, Urgency::Emergency);
        assert_eq!(analysis.confidence, 0.9);
    }

    #[test]
    fn test_empty_input() {
        let engine = TriageEngine::new();
        let analysis = engine.analyze("   ");
        assert!(analysis.symptoms.is_empty());
        assert_eq!(analysis.severity, Severity::Mild);
        assert_eq!(analysis.urgency, Urgency::Low);
        assert_eq!(analysis.confidence, 0.6);
        assert_eq!(analysis.recommendations.len(), 7);
    }

    #[test]
    fn test_respond_uses_name() {
        let engine = TriageEngine::new();
        let (_, text) = engine.respond("i feel a slight nausea", Some("Sam"));
        assert!(text.starts_with("Hi Sam! I've analyzed your symptoms."));
    }

    #[test]
    fn test_custom_knowledge_base() {
        let mut kb = KnowledgeBase::builtin();
        kb.emergency_phrases.push("anaphylaxis");
        let engine = TriageEngine::with_knowledge(kb);
        assert!(engine.analyze("possible anaphylaxis").is_emergency);
        assert!(!TriageEngine::new().analyze("possible anaphylaxis").is_emergency);
    }
}
