//! Analysis value types.

use serde::{Deserialize, Serialize};

/// Three-level severity derived from the indicator score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }

    /// Capitalized label used in rendered replies.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
        }
    }

    /// Score weight of an indicator phrase at this level.
    pub fn weight(&self) -> u32 {
        match self {
            Self::Mild => 1,
            Self::Moderate => 3,
            Self::Severe => 5,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mild" => Ok(Self::Mild),
            "moderate" => Ok(Self::Moderate),
            "severe" => Ok(Self::Severe),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}

/// Coarse triage label. `Emergency` is only produced by the fast path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Emergency,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Emergency => "emergency",
        }
    }
}

impl From<Severity> for Urgency {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Severe => Urgency::High,
            Severity::Moderate => Urgency::Medium,
            Severity::Mild => Urgency::Low,
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "emergency" => Ok(Self::Emergency),
            other => Err(format!("unknown urgency: {}", other)),
        }
    }
}

/// Result of analyzing one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Discovery order, at most 10 entries, no duplicates.
    pub symptoms: Vec<String>,
    pub severity: Severity,
    pub urgency: Urgency,
    /// In `[0.0, 0.95]`.
    pub confidence: f64,
    /// Deduplicated, first-occurrence order.
    pub recommendations: Vec<String>,
    /// Knowledge base order.
    pub potential_conditions: Vec<String>,
    #[serde(default)]
    pub is_emergency: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_follows_severity() {
        assert_eq!(Urgency::from(Severity::Mild), Urgency::Low);
        assert_eq!(Urgency::from(Severity::Moderate), Urgency::Medium);
        assert_eq!(Urgency::from(Severity::Severe), Urgency::High);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Severity::Moderate).unwrap();
        assert_eq!(json, "\"moderate\"");
        let urgency: Urgency = serde_json::from_str("\"emergency\"").unwrap();
        assert_eq!(urgency, Urgency::Emergency);
    }
}
