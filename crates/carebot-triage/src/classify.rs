//! Health-relatedness gate: decides whether a message goes to triage at all.

pub const HEALTH_KEYWORDS: &[&str] = &[
    "pain", "hurt", "ache", "fever", "sick", "ill", "nausea", "vomit", "headache", "stomach",
    "cough", "cold", "flu", "dizzy", "tired", "fatigue", "symptom", "doctor", "medicine",
    "treatment", "health", "medical", "hospital", "injury", "wound", "bleeding", "infection",
    "allergy", "rash", "breathing", "chest", "heart", "temperature", "swollen", "sore", "cramp",
    "sprain", "broken", "burn", "cut",
];

pub const HEALTH_PATTERNS: &[&str] = &[
    "i feel",
    "i have",
    "my body",
    "experiencing",
    "suffering from",
    "what should i do for",
    "how to treat",
    "is it normal",
    "should i see a doctor",
    "medical advice",
];

/// Case-insensitive substring match against the keyword and phrase lists.
pub fn is_health_related(message: &str) -> bool {
    let lowered = message.to_lowercase();
    HEALTH_KEYWORDS
        .iter()
        .chain(HEALTH_PATTERNS.iter())
        .any(|needle| lowered.contains(needle))
}
