use serde::{Deserialize, Serialize};
use std::fmt;

/// Triage order: `High` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
    Informational,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Informational,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Informational => "informational",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::High => "red",
            Self::Medium => "yellow",
            Self::Low => "blue",
            Self::Informational => "cyan",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::High => "🔴",
            Self::Medium => "🟡",
            Self::Low => "🔵",
            Self::Informational => "ℹ️",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
            Self::Informational => write!(f, "Informational"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triage_order() {
        let mut severities = vec![
            Severity::Low,
            Severity::High,
            Severity::Informational,
            Severity::Medium,
        ];
        severities.sort();
        assert_eq!(severities, Severity::ALL.to_vec());
    }

    #[test]
    fn test_serialized_lowercase() {
        let json = serde_json::to_string(&Severity::Informational).unwrap();
        assert_eq!(json, "\"informational\"");
    }
}
