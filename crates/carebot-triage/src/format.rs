//! Rendering an [`AnalysisResult`] into reply text.

use crate::types::{AnalysisResult, Urgency};

pub const DEFAULT_DISPLAY_NAME: &str = "there";
pub const MAX_RENDERED_SYMPTOMS: usize = 5;
pub const MAX_RENDERED_RECOMMENDATIONS: usize = 6;

pub const DISCLAIMER: &str =
    "⚠️ This is AI-generated advice. Always consult healthcare professionals for serious concerns.";

pub const EMERGENCY_NOTICE: &str = "🚨 EMERGENCY DETECTED 🚨

This appears to be a medical emergency!

IMMEDIATE ACTIONS:
1. Call emergency services (911) NOW
2. If possible, go to the nearest emergency room
3. Do not drive yourself
4. Stay calm and follow emergency operator instructions

This AI cannot provide emergency medical care. Please seek immediate professional help.

Stay safe! 🙏";

/// Resolve the greeting name; blank or absent names fall back to "there".
pub fn display_name(name: Option<&str>) -> &str {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => DEFAULT_DISPLAY_NAME,
    }
}

/// Render the analysis. Emergencies get the fixed notice; everything else
/// gets the sectioned summary.
pub fn format_response(analysis: &AnalysisResult, name: Option<&str>) -> String {
    if analysis.is_emergency || analysis.urgency == Urgency::Emergency {
        return EMERGENCY_NOTICE.to_string();
    }

    let mut parts: Vec<String> = Vec::new();

    parts.push(format!(
        "Hi {}! I've analyzed your symptoms.",
        display_name(name)
    ));

    if !analysis.symptoms.is_empty() {
        let shown: Vec<&str> = analysis
            .symptoms
            .iter()
            .take(MAX_RENDERED_SYMPTOMS)
            .map(String::as_str)
            .collect();
        parts.push(format!("📋 Symptoms identified: {}", shown.join(", ")));
    }

    parts.push(format!("📊 Severity: {}", analysis.severity.title()));

    if !analysis.potential_conditions.is_empty() {
        parts.push(format!(
            "🔍 This might be related to: {}",
            analysis.potential_conditions.join(", ")
        ));
    }

    parts.push("💡 Recommendations:".to_string());
    for (i, rec) in analysis
        .recommendations
        .iter()
        .take(MAX_RENDERED_RECOMMENDATIONS)
        .enumerate()
    {
        parts.push(format!("{}. {}", i + 1, rec));
    }

    parts.push(format!("ℹ️ Confidence: {}", format_percent(analysis.confidence)));
    parts.push(DISCLAIMER.to_string());

    parts.join("\n\n")
}

/// 0.87 → "87%".
pub fn format_percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emergency::emergency_analysis;
    use crate::types::Severity;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            symptoms: vec!["fever".into(), "cough".into()],
            severity: Severity::Moderate,
            urgency: Urgency::Medium,
            confidence: 0.87,
            recommendations: vec!["Rest".into(), "Drink fluids".into()],
            potential_conditions: vec!["Flu".into()],
            is_emergency: false,
        }
    }

    #[test]
    fn test_normal_layout() {
        let text = format_response(&sample(), Some("Ana"));
        let expected = [
            "Hi Ana! I've analyzed your symptoms.",
            "📋 Symptoms identified: fever, cough",
            "📊 Severity: Moderate",
            "🔍 This might be related to: Flu",
            "💡 Recommendations:",
            "1. Rest",
            "2. Drink fluids",
            "ℹ️ Confidence: 87%",
            DISCLAIMER,
        ]
        .join("\n\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn test_optional_sections_leave_no_gaps() {
        let mut analysis = sample();
        analysis.symptoms.clear();
        analysis.potential_conditions.clear();
        let text = format_response(&analysis, None);
        assert!(text.starts_with("Hi there! I've analyzed your symptoms.\n\n📊 Severity: Moderate"));
        assert!(!text.contains("Symptoms identified"));
        assert!(!text.contains("might be related"));
        assert!(!text.contains("\n\n\n"));
    }

    #[test]
    fn test_truncation() {
        let mut analysis = sample();
        analysis.symptoms = (1..=8).map(|i| format!("s{}", i)).collect();
        analysis.recommendations = (1..=9).map(|i| format!("r{}", i)).collect();
        let text = format_response(&analysis, Some(""));
        assert!(text.contains("📋 Symptoms identified: s1, s2, s3, s4, s5\n\n"));
        assert!(text.contains("6. r6"));
        assert!(!text.contains("7. r7"));
        assert!(text.starts_with("Hi there!"));
    }

    #[test]
    fn test_emergency_is_fixed_text() {
        let a = format_response(&emergency_analysis(), Some("Ana"));
        let b = format_response(&emergency_analysis(), None);
        assert_eq!(a, EMERGENCY_NOTICE);
        assert_eq!(a, b);
    }

    #[test]
    fn test_percent() {
        assert_eq!(format_percent(0.6), "60%");
        assert_eq!(format_percent(0.95), "95%");
        assert_eq!(format_percent(0.87), "87%");
    }
}
