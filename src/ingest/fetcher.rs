use alloy::primitives::Address;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::str::FromStr;
use std::time::Duration;

use crate::config::FetcherConfig;

use super::types::{EntityType, InputPayload, Transaction};

pub const API_KEY_ENV: &str = "POLYGONSCAN_API_KEY";

/// Chains the explorer client can query.
pub const SUPPORTED_CHAINS: &[&str] = &["polygon"];

const NO_TRANSACTIONS_MESSAGE: &str = "No transactions found";

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    message: String,
    #[serde(default)]
    result: JsonValue,
}

/// One `txlist` entry as returned by the explorer. Numeric fields arrive as strings.
#[derive(Debug, Deserialize)]
struct RawTransaction {
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(rename = "gasUsed", default)]
    gas_used: JsonValue,
    #[serde(rename = "timeStamp", default)]
    time_stamp: JsonValue,
    #[serde(rename = "methodId", default)]
    method_id: Option<String>,
    #[serde(rename = "functionName", default)]
    function_name: Option<String>,
}

/// Block-explorer client producing payloads for the risk pipeline.
pub struct Fetcher {
    client: reqwest::Client,
    config: FetcherConfig,
    api_key: String,
}

impl Fetcher {
    /// Build a client. The configured key wins over POLYGONSCAN_API_KEY.
    pub fn new(config: FetcherConfig) -> eyre::Result<Self> {
        let api_key = resolve_api_key(config.api_key.clone(), std::env::var(API_KEY_ENV).ok())
            .ok_or_else(|| {
                eyre::eyre!("{} is not set in environment variables.", API_KEY_ENV)
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| eyre::eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Reject lookups this client can never serve, before any network call.
    pub fn validate_target(address: &str, chain: &str) -> eyre::Result<()> {
        if !SUPPORTED_CHAINS.contains(&chain.to_lowercase().as_str()) {
            return Err(eyre::eyre!(
                "Unsupported chain '{}'. Currently only 'polygon' chain is supported.",
                chain
            ));
        }
        Address::from_str(address)
            .map_err(|e| eyre::eyre!("Invalid address '{}': {}", address, e))?;
        Ok(())
    }

    /// Fetch the most recent transactions of `address`, newest first.
    pub async fn fetch_transactions(
        &self,
        address: &str,
        chain: &str,
    ) -> eyre::Result<InputPayload> {
        Self::validate_target(address, chain)?;

        let params = [
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", address.to_string()),
            ("startblock", "0".to_string()),
            ("endblock", "99999999".to_string()),
            ("page", "1".to_string()),
            ("offset", self.config.page_size.to_string()),
            ("sort", "desc".to_string()),
            ("apikey", self.api_key.clone()),
        ];

        let response: ExplorerResponse = self
            .client
            .get(&self.config.api_url)
            .query(&params)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| eyre::eyre!("Failed to fetch transactions: {}", e))?
            .json()
            .await
            .map_err(|e| eyre::eyre!("Failed to decode explorer response: {}", e))?;

        if response.status != "1" && response.message != NO_TRANSACTIONS_MESSAGE {
            let detail = match &response.result {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(eyre::eyre!("API Error: {} - {}", response.message, detail));
        }

        let raw_txs = match response.result {
            JsonValue::Array(items) => items,
            JsonValue::Null => Vec::new(),
            other => {
                return Err(eyre::eyre!("Unexpected explorer result format: {}", other));
            }
        };

        let transactions = normalize_transactions(&raw_txs);
        tracing::info!(
            address,
            chain,
            received = raw_txs.len(),
            normalized = transactions.len(),
            "Fetched transactions"
        );

        Ok(InputPayload {
            entity_type: EntityType::Wallet,
            entity_id: address.to_string(),
            chain: chain.to_string(),
            transactions,
        })
    }
}

/// Pick the configured key, then the environment. Blank keys count as unset.
pub fn resolve_api_key(configured: Option<String>, from_env: Option<String>) -> Option<String> {
    configured
        .filter(|k| !k.trim().is_empty())
        .or_else(|| from_env.filter(|k| !k.trim().is_empty()))
}

/// Convert explorer `txlist` entries to transactions, skipping malformed ones.
pub fn normalize_transactions(raw_txs: &[JsonValue]) -> Vec<Transaction> {
    raw_txs
        .iter()
        .filter_map(|raw| match normalize_transaction(raw) {
            Some(tx) => Some(tx),
            None => {
                tracing::debug!(entry = %raw, "Skipping malformed explorer transaction");
                None
            }
        })
        .collect()
}

fn normalize_transaction(raw: &JsonValue) -> Option<Transaction> {
    let raw: RawTransaction = serde_json::from_value(raw.clone()).ok()?;

    let gas_used = parse_integer(&raw.gas_used)?;
    let timestamp = parse_integer(&raw.time_stamp)?;

    // Verified contracts expose "transfer(address,uint256)"; keep the bare name.
    let method = match raw.function_name.as_deref() {
        Some(name) if !name.is_empty() => name.split('(').next().map(str::to_string),
        _ => raw.method_id,
    }
    .filter(|m| !m.is_empty());

    Some(Transaction {
        hash: raw.hash.unwrap_or_default(),
        from_addr: raw.from.unwrap_or_default(),
        to_addr: raw.to.unwrap_or_default(),
        value: raw.value.unwrap_or_else(|| "0".to_string()),
        gas_used: u64::try_from(gas_used).ok()?,
        timestamp,
        method,
    })
}

/// Missing values count as zero; anything non-integer rejects the entry.
fn parse_integer(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Null => Some(0),
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
