//! Symptom triage: a deterministic keyword/pattern pipeline over a static
//! knowledge base.
//!
//! Text goes through the emergency detector first; anything that is not an
//! emergency is run through extraction, severity scoring, recommendation and
//! condition composition, and a confidence heuristic. The resulting
//! [`AnalysisResult`] is rendered by [`format::format_response`].
//!
//! The output is advisory text, not a diagnosis.

pub mod classify;
pub mod compose;
pub mod confidence;
pub mod emergency;
pub mod engine;
pub mod extract;
pub mod format;
pub mod knowledge;
pub mod scoring;
pub mod tips;
pub mod types;

pub use classify::is_health_related;
pub use engine::{AnalysisRecorder, TriageEngine};
pub use knowledge::{Condition, KnowledgeBase, SymptomCategory};
pub use types::{AnalysisResult, Severity, Urgency};
