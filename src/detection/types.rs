use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Diagnostic values attached to a finding.
pub type Metadata = serde_json::Map<String, JsonValue>;

/// Ordinal risk level of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Stable identifiers of the registered rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleId {
    HighFrequency,
    WashTrading,
    RepeatedContractCalls,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighFrequency => "HIGH_FREQUENCY",
            Self::WashTrading => "WASH_TRADING_SUSPECT",
            Self::RepeatedContractCalls => "REPEATED_CONTRACT_CALLS",
        }
    }
}

/// A single rule's positive detection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Finding {
    pub fn new(rule: RuleId, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            rule_id: rule.as_str().to_string(),
            severity,
            description: description.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}
