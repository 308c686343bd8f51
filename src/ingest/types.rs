use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Kind of entity being assessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Wallet,
    Contract,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wallet => "wallet",
            Self::Contract => "contract",
        }
    }
}

/// A normalized transaction belonging to the assessed entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    #[serde(rename = "from", alias = "from_addr")]
    pub from_addr: String,
    #[serde(rename = "to", alias = "to_addr")]
    pub to_addr: String,
    /// Decimal amount in the chain's smallest unit, kept as text.
    pub value: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub gas_used: u64,
    #[serde(deserialize_with = "lenient_i64")]
    pub timestamp: i64,
    #[serde(default)]
    pub method: Option<String>,
}

/// All transactions of one entity on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPayload {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub chain: String,
    pub transactions: Vec<Transaction>,
}

impl InputPayload {
    pub fn from_json(raw: &str) -> eyre::Result<Self> {
        serde_json::from_str(raw).map_err(|e| eyre::eyre!("Invalid input payload: {}", e))
    }

    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read input file '{}': {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| eyre::eyre!("Invalid input payload in '{}': {}", path.display(), e))
    }
}

// ============================================================
// Numeric coercion
// ============================================================

// Explorer exports frequently carry numbers as strings ("21000").
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(serde_json::Number),
    Text(String),
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom(format!("expected an integer, got {}", n))),
        NumberOrString::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected an integer, got '{}'", s))),
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n.as_u64().ok_or_else(|| {
            serde::de::Error::custom(format!("expected a non-negative integer, got {}", n))
        }),
        NumberOrString::Text(s) => s.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("expected a non-negative integer, got '{}'", s))
        }),
    }
}
