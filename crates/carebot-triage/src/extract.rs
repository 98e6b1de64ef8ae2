//! Symptom extraction: a keyword pass over the taxonomy, then a pattern pass
//! over free-form phrasing ("i have ...", "my ... hurts").

use once_cell::sync::Lazy;
use regex::Regex;

use crate::knowledge::KnowledgeBase;

/// Maximum number of symptoms kept per message.
pub const MAX_SYMPTOMS: usize = 10;

/// Free-form symptom phrasings, applied in this order.
static SYMPTOM_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)i have (.*?)(?:\.|$)",
        r"(?i)experiencing (.*?)(?:\.|$)",
        r"(?i)feeling (.*?)(?:\.|$)",
        r"(?i)my (.*?) hurts?",
        r"(?i)(.*?) is bothering me",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Extract symptom mentions from normalized text.
///
/// Keyword hits come first in category/keyword order, pattern captures are
/// appended unless already present. Capped at [`MAX_SYMPTOMS`].
pub fn extract_symptoms(kb: &KnowledgeBase, normalized: &str) -> Vec<String> {
    let mut symptoms: Vec<String> = Vec::new();

    for category in &kb.categories {
        for keyword in category.keywords {
            if normalized.contains(keyword) {
                symptoms.push(keyword.to_string());
            }
        }
    }

    for pattern in SYMPTOM_PATTERNS.iter() {
        for caps in pattern.captures_iter(normalized) {
            let Some(m) = caps.get(1) else { continue };
            let candidate = m.as_str().trim();
            if candidate.chars().count() > 2 && !symptoms.iter().any(|s| s == candidate) {
                symptoms.push(candidate.to_string());
            }
        }
    }

    symptoms.truncate(MAX_SYMPTOMS);
    symptoms
}
