//! Recommendation and condition composition.

use std::collections::HashSet;

use crate::knowledge::KnowledgeBase;
use crate::types::Severity;

/// Minimum number of distinct defining phrases a condition needs.
pub const MIN_CONDITION_MATCHES: usize = 2;

pub const FEVER_ADVICE: &str = "Stay hydrated and consider fever reducers";
pub const PAIN_ADVICE: &str = "Apply appropriate hot/cold therapy";
pub const COUGH_ADVICE: &str = "Try throat lozenges or warm liquids";

/// The three advice lines opening every non-emergency reply.
pub fn severity_advice(severity: Severity) -> &'static [&'static str] {
    match severity {
        Severity::Severe => &[
            "Seek immediate medical attention",
            "Consider visiting an urgent care center or emergency room",
            "Monitor symptoms closely",
        ],
        Severity::Moderate => &[
            "Consider consulting with a healthcare provider",
            "Monitor symptoms for changes",
            "Rest and self-care measures may help",
        ],
        Severity::Mild => &[
            "Try home remedies and self-care",
            "Monitor symptoms for any worsening",
            "Consider over-the-counter treatments if appropriate",
        ],
    }
}

/// Advice for a single symptom; fever wins over pain, pain over cough.
pub fn symptom_advice(symptom: &str) -> Option<&'static str> {
    if symptom.contains("fever") {
        Some(FEVER_ADVICE)
    } else if symptom.contains("pain") {
        Some(PAIN_ADVICE)
    } else if symptom.contains("cough") {
        Some(COUGH_ADVICE)
    } else {
        None
    }
}

/// Severity tier advice, then per-symptom advice, then general advice,
/// deduplicated keeping the first occurrence.
pub fn generate_recommendations(
    kb: &KnowledgeBase,
    symptoms: &[String],
    severity: Severity,
) -> Vec<String> {
    let candidates = severity_advice(severity)
        .iter()
        .copied()
        .chain(symptoms.iter().filter_map(|s| symptom_advice(s)))
        .chain(kb.general_advice.iter().copied());

    let mut seen = HashSet::new();
    candidates
        .filter(|advice| seen.insert(*advice))
        .map(str::to_string)
        .collect()
}

/// Conditions with at least [`MIN_CONDITION_MATCHES`] defining phrases found
/// inside the extracted symptoms, in knowledge base order.
pub fn identify_conditions(kb: &KnowledgeBase, symptoms: &[String]) -> Vec<String> {
    let lowered: Vec<String> = symptoms.iter().map(|s| s.to_lowercase()).collect();

    kb.conditions
        .iter()
        .filter(|condition| {
            let matches = condition
                .symptoms
                .iter()
                .filter(|phrase| {
                    let phrase = phrase.to_lowercase();
                    lowered.iter().any(|s| s.contains(&phrase))
                })
                .count();
            matches >= MIN_CONDITION_MATCHES
        })
        .map(|condition| condition.display_name())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_symptom_advice_first_match_only() {
        assert_eq!(symptom_advice("fever pain"), Some(FEVER_ADVICE));
        assert_eq!(symptom_advice("stomach pain and cough"), Some(PAIN_ADVICE));
        assert_eq!(symptom_advice("dry cough"), Some(COUGH_ADVICE));
        assert_eq!(symptom_advice("nausea"), None);
    }

    #[test]
    fn test_recommendations_order_and_dedup() {
        let kb = KnowledgeBase::builtin();
        let recs = generate_recommendations(
            &kb,
            &strings(&["fever", "a fever again", "pain"]),
            Severity::Moderate,
        );
        assert_eq!(
            recs,
            strings(&[
                "Consider consulting with a healthcare provider",
                "Monitor symptoms for changes",
                "Rest and self-care measures may help",
                FEVER_ADVICE,
                PAIN_ADVICE,
                "This is not a substitute for professional medical advice",
                "Consult a healthcare provider for persistent or severe symptoms",
                "Call emergency services for life-threatening situations",
                "Keep track of your symptoms and their progression",
            ])
        );
    }

    #[test]
    fn test_general_advice_always_present() {
        let kb = KnowledgeBase::builtin();
        let recs = generate_recommendations(&kb, &[], Severity::Mild);
        assert_eq!(recs.len(), 7);
        for advice in &kb.general_advice {
            assert!(recs.iter().any(|r| r == advice));
        }
    }

    #[test]
    fn test_condition_needs_two_distinct_phrases() {
        let kb = KnowledgeBase::builtin();
        // "fever" matches twice but it is one phrase
        let symptoms = strings(&["fever", "headache", "a severe headache and fever"]);
        assert!(identify_conditions(&kb, &symptoms).is_empty());

        let symptoms = strings(&["fever", "cough"]);
        assert_eq!(identify_conditions(&kb, &symptoms), vec!["Flu"]);
    }

    #[test]
    fn test_condition_order_follows_knowledge_base() {
        let kb = KnowledgeBase::builtin();
        let symptoms = strings(&["nausea", "vomiting", "fever", "fatigue"]);
        assert_eq!(identify_conditions(&kb, &symptoms), vec!["Flu", "Stomach Bug"]);
    }

    #[test]
    fn test_condition_matching_is_case_insensitive() {
        let kb = KnowledgeBase::builtin();
        let symptoms = strings(&["Runny Nose", "SNEEZING"]);
        assert_eq!(identify_conditions(&kb, &symptoms), vec!["Cold"]);
    }
}
