//! Confidence heuristic: how much textual signal was available.

pub const BASE_CONFIDENCE: f64 = 0.6;
pub const MAX_SYMPTOM_BONUS: f64 = 0.3;
pub const MAX_LENGTH_BONUS: f64 = 0.1;
pub const MAX_CONFIDENCE: f64 = 0.95;

/// `min(0.6 + min(0.1·symptoms, 0.3) + min(0.01·words, 0.1), 0.95)`.
pub fn calculate_confidence(symptom_count: usize, message: &str) -> f64 {
    let word_count = message.split_whitespace().count();
    let symptom_bonus = (symptom_count as f64 * 0.1).min(MAX_SYMPTOM_BONUS);
    let length_bonus = (word_count as f64 * 0.01).min(MAX_LENGTH_BONUS);
    (BASE_CONFIDENCE + symptom_bonus + length_bonus).min(MAX_CONFIDENCE)
}
