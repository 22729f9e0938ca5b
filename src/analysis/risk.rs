//! Mapping from the service's risk categories to the three-way level

use crate::session::RiskLevel;
use serde_json::Value;

/// Risk category as reported by the inference service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRiskLevel {
    Low,
    Medium,
    High,
    Critical,
    Unknown,
    /// Anything the service may add later, or a malformed value
    Unrecognized(String),
}

impl RemoteRiskLevel {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Low" => Self::Low,
            "Medium" => Self::Medium,
            "High" => Self::High,
            "Critical" => Self::Critical,
            "Unknown" => Self::Unknown,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Non-string and missing values are unrecognized, never an error
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::parse(s),
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn to_risk_level(&self) -> RiskLevel {
        match self {
            Self::Low => RiskLevel::Low,
            Self::Medium => RiskLevel::Moderate,
            Self::High | Self::Critical => RiskLevel::High,
            Self::Unknown => RiskLevel::Moderate,
            Self::Unrecognized(raw) => {
                tracing::warn!("[Analysis] Unrecognized risk level '{}', using moderate", raw);
                RiskLevel::Moderate
            }
        }
    }
}
