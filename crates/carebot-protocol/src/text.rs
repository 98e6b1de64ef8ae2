//! Lightweight text heuristics used around the triage engine.

use std::collections::HashSet;

use chrono::Timelike;
use once_cell::sync::Lazy;
use regex::Regex;

const MAX_KEYWORDS: usize = 20;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
        "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
        "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
        "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
        "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
        "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
        "for", "with", "through", "during", "before", "after", "above", "below", "up", "down",
        "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    ]
    .into_iter()
    .collect()
});

const POSITIVE_WORDS: &[&str] = &[
    "good", "better", "great", "excellent", "fine", "okay", "well", "healthy", "happy", "relief",
    "improved", "recovering", "healing",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "worse", "terrible", "awful", "sick", "ill", "pain", "hurt", "ache", "suffering",
    "miserable", "worried", "scared", "anxious",
];

static PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

static EMERGENCY_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b(can'?t breathe|difficulty breathing|shortness of breath)\b",
        r"\b(chest pain|heart attack|heart problem)\b",
        r"\b(stroke|paralyzed|can'?t move)\b",
        r"\b(severe bleeding|blood loss)\b",
        r"\b(unconscious|passed out|fainted)\b",
        r"\b(poisoning|overdose)\b",
        r"\b(severe allergic reaction|anaphylaxis)\b",
        r"\b(broken bone|fracture)\b",
        r"\b(head injury|concussion)\b",
        r"\b(seizure|convulsion)\b",
        r"\b(emergency|911|urgent)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Content words of `text`: lowercased, punctuation removed, stop words and
/// words of two characters or fewer dropped, at most 20.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = PUNCT_RE.replace_all(&lowered, " ");
    cleaned
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(*w) && w.chars().count() > 2)
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

/// Word-list sentiment in `[-1.0, 1.0]`; `0.0` when no sentiment words occur.
pub fn message_sentiment(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let (mut positive, mut negative) = (0i32, 0i32);
    for word in WORD_RE.find_iter(&lowered).map(|m| m.as_str()) {
        if POSITIVE_WORDS.contains(&word) {
            positive += 1;
        } else if NEGATIVE_WORDS.contains(&word) {
            negative += 1;
        }
    }
    let total = positive + negative;
    if total == 0 {
        return 0.0;
    }
    f64::from(positive - negative) / f64::from(total)
}

/// Word-boundary emergency screen. Broader than the triage engine's phrase
/// list (covers e.g. "fainted", "anaphylaxis", "911").
pub fn is_medical_emergency(text: &str) -> bool {
    let lowered = text.to_lowercase();
    EMERGENCY_RES.iter().any(|re| re.is_match(&lowered))
}

/// Greeting for an hour of the day (0-23).
pub fn time_greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        17..=20 => "Good evening",
        _ => "Hello",
    }
}

/// [`time_greeting`] for the local wall clock.
pub fn current_time_greeting() -> &'static str {
    time_greeting(chrono::Local::now().hour())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keywords() {
        let keywords = extract_keywords("I have a terrible headache, and my throat is sore!");
        assert_eq!(keywords, vec!["terrible", "headache", "throat", "sore"]);

        let many = "word ".repeat(30);
        assert_eq!(extract_keywords(&many).len(), 20);
    }

    #[test]
    fn test_sentiment() {
        assert_eq!(message_sentiment("hello there"), 0.0);
        assert_eq!(message_sentiment("I feel awful and sick"), -1.0);
        assert_eq!(message_sentiment("Feeling better, still some pain"), 0.0);
        assert_eq!(message_sentiment("Great, I'm healthy and happy"), 1.0);
    }

    #[test]
    fn test_emergency_screen() {
        assert!(is_medical_emergency("My dad just FAINTED"));
        assert!(is_medical_emergency("I can't breathe"));
        assert!(is_medical_emergency("is this urgent?"));
        assert!(!is_medical_emergency("heatstroke prevention tips"));
        assert!(!is_medical_emergency("mild cough"));
    }

    #[test]
    fn test_time_greeting() {
        assert_eq!(time_greeting(4), "Hello");
        assert_eq!(time_greeting(5), "Good morning");
        assert_eq!(time_greeting(12), "Good afternoon");
        assert_eq!(time_greeting(17), "Good evening");
        assert_eq!(time_greeting(21), "Hello");
    }
}
