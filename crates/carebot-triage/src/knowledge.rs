//! Static knowledge base: symptom taxonomy, emergency phrases, conditions,
//! general advice.
//!
//! Iteration order of every list here is part of the observable behavior
//! (symptom discovery order, condition order), so all collections are `Vec`s.

use once_cell::sync::Lazy;

use crate::types::Severity;

/// A symptom category with its keywords and per-level severity indicators.
#[derive(Debug, Clone)]
pub struct SymptomCategory {
    pub id: &'static str,
    pub keywords: &'static [&'static str],
    pub mild: &'static [&'static str],
    pub moderate: &'static [&'static str],
    pub severe: &'static [&'static str],
}

impl SymptomCategory {
    /// Indicator phrases grouped by level, mild first.
    pub fn indicators(&self) -> [(Severity, &'static [&'static str]); 3] {
        [
            (Severity::Mild, self.mild),
            (Severity::Moderate, self.moderate),
            (Severity::Severe, self.severe),
        ]
    }
}

/// A named condition and the symptom phrases that define it.
#[derive(Debug, Clone)]
pub struct Condition {
    pub name: &'static str,
    pub symptoms: &'static [&'static str],
}

impl Condition {
    /// `stomach_bug` → `Stomach Bug`.
    pub fn display_name(&self) -> String {
        title_case(&self.name.replace('_', " "))
    }
}

/// Immutable triage data, built once at startup.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    pub categories: Vec<SymptomCategory>,
    pub emergency_phrases: Vec<&'static str>,
    pub conditions: Vec<Condition>,
    pub general_advice: Vec<&'static str>,
}

static BUILTIN: Lazy<KnowledgeBase> = Lazy::new(KnowledgeBase::builtin);

impl KnowledgeBase {
    /// Shared instance of the built-in knowledge base.
    pub fn shared() -> &'static KnowledgeBase {
        &BUILTIN
    }

    /// Build the built-in knowledge base.
    pub fn builtin() -> Self {
        Self {
            categories: vec![
                SymptomCategory {
                    id: "pain",
                    keywords: &["pain", "ache", "hurt", "sore", "tender", "throbbing", "stabbing"],
                    mild: &["slight", "minor", "little"],
                    moderate: &["moderate", "noticeable"],
                    severe: &["severe", "intense", "unbearable", "excruciating"],
                },
                SymptomCategory {
                    id: "fever",
                    keywords: &["fever", "temperature", "hot", "chills", "sweating"],
                    mild: &["low grade", "slight fever"],
                    moderate: &["fever", "high temperature"],
                    severe: &["high fever", "burning up"],
                },
                SymptomCategory {
                    id: "respiratory",
                    keywords: &[
                        "cough",
                        "breathing",
                        "shortness of breath",
                        "wheezing",
                        "congestion",
                    ],
                    mild: &["slight cough", "light congestion"],
                    moderate: &["persistent cough", "difficulty breathing"],
                    severe: &["severe breathing problems", "can't breathe"],
                },
                SymptomCategory {
                    id: "digestive",
                    keywords: &["nausea", "vomiting", "diarrhea", "stomach pain", "constipation"],
                    mild: &["slight nausea", "mild stomach upset"],
                    moderate: &["vomiting", "stomach pain"],
                    severe: &["severe vomiting", "intense stomach pain"],
                },
                SymptomCategory {
                    id: "neurological",
                    keywords: &["headache", "dizziness", "confusion", "memory problems"],
                    mild: &["mild headache", "slight dizziness"],
                    moderate: &["headache", "dizzy"],
                    severe: &["severe headache", "extreme dizziness", "confusion"],
                },
            ],
            emergency_phrases: vec![
                "chest pain",
                "heart attack",
                "stroke",
                "seizure",
                "unconscious",
                "difficulty breathing",
                "severe bleeding",
                "poisoning",
                "overdose",
                "severe allergic reaction",
                "broken bone",
                "head injury",
            ],
            conditions: vec![
                Condition {
                    name: "cold",
                    symptoms: &["runny nose", "sneezing", "mild cough", "sore throat"],
                },
                Condition {
                    name: "flu",
                    symptoms: &["fever", "body aches", "fatigue", "cough"],
                },
                Condition {
                    name: "headache",
                    symptoms: &["head pain", "pressure", "tension"],
                },
                Condition {
                    name: "stomach_bug",
                    symptoms: &["nausea", "vomiting", "diarrhea", "stomach cramps"],
                },
            ],
            general_advice: vec![
                "This is not a substitute for professional medical advice",
                "Consult a healthcare provider for persistent or severe symptoms",
                "Call emergency services for life-threatening situations",
                "Keep track of your symptoms and their progression",
            ],
        }
    }

    /// Iterate every `(category, level, phrase)` indicator triple.
    pub fn indicator_triples(
        &self,
    ) -> impl Iterator<Item = (&SymptomCategory, Severity, &'static str)> + '_ {
        self.categories.iter().flat_map(|category| {
            category
                .indicators()
                .into_iter()
                .flat_map(move |(level, phrases)| {
                    phrases.iter().map(move |phrase| (category, level, *phrase))
                })
        })
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
