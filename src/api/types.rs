use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================
// Query params
// ============================================================

#[derive(Debug, Deserialize)]
pub struct ChainParams {
    pub chain: Option<String>,
}

impl ChainParams {
    pub fn chain_or_default(&self) -> &str {
        self.chain.as_deref().unwrap_or("polygon")
    }
}

// ============================================================
// Response types
// ============================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub rules: usize,
    pub fetcher_enabled: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
