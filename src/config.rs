use serde::Deserialize;
use std::path::Path;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "CHAINGUARD_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "chainguard.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

// ============================================================
// Detection Config
// ============================================================

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DetectionConfig {
    #[serde(default)]
    pub high_frequency: HighFrequencyConfig,
    #[serde(default)]
    pub wash_trading: WashTradingConfig,
    #[serde(default)]
    pub repeated_calls: RepeatedCallsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HighFrequencyConfig {
    #[serde(default = "default_min_transactions")]
    pub min_transactions: usize,
    #[serde(default = "default_max_tx_per_minute")]
    pub max_tx_per_minute: f64,
}

impl Default for HighFrequencyConfig {
    fn default() -> Self {
        Self {
            min_transactions: 5,
            max_tx_per_minute: 10.0,
        }
    }
}

fn default_min_transactions() -> usize {
    5
}

fn default_max_tx_per_minute() -> f64 {
    10.0
}

#[derive(Debug, Deserialize, Clone)]
pub struct WashTradingConfig {
    #[serde(default = "default_min_pair_count")]
    pub min_pair_count: usize,
    /// Share of all transactions a single pair must exceed.
    #[serde(default = "default_concentration_ratio")]
    pub concentration_ratio: f64,
}

impl Default for WashTradingConfig {
    fn default() -> Self {
        Self {
            min_pair_count: 2,
            concentration_ratio: 0.5,
        }
    }
}

fn default_min_pair_count() -> usize {
    2
}

fn default_concentration_ratio() -> f64 {
    0.5
}

#[derive(Debug, Deserialize, Clone)]
pub struct RepeatedCallsConfig {
    #[serde(default = "default_max_calls_per_method")]
    pub max_calls_per_method: usize,
}

impl Default for RepeatedCallsConfig {
    fn default() -> Self {
        Self {
            max_calls_per_method: 5,
        }
    }
}

fn default_max_calls_per_method() -> usize {
    5
}

// ============================================================
// Scoring Config
// ============================================================

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: SeverityWeights,
}

/// Score contribution of one finding per severity. Unset keys keep their default.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SeverityWeights {
    #[serde(default = "default_low_weight")]
    pub low: u32,
    #[serde(default = "default_medium_weight")]
    pub medium: u32,
    #[serde(default = "default_high_weight")]
    pub high: u32,
    #[serde(default = "default_critical_weight")]
    pub critical: u32,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            low: 10,
            medium: 30,
            high: 60,
            critical: 90,
        }
    }
}

fn default_low_weight() -> u32 {
    10
}

fn default_medium_weight() -> u32 {
    30
}

fn default_high_weight() -> u32 {
    60
}

fn default_critical_weight() -> u32 {
    90
}

// ============================================================
// Fetcher Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct FetcherConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Falls back to POLYGONSCAN_API_KEY when unset.
    pub api_key: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            page_size: 100,
            timeout_secs: 10,
        }
    }
}

fn default_api_url() -> String {
    "https://api.polygonscan.com/api".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    10
}

// ============================================================
// API Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_api_host")]
    pub host: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

fn default_api_port() -> u16 {
    3000
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read config file '{}': {}", path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| eyre::eyre!("Failed to parse config file '{}': {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config file if it exists, otherwise use built-in defaults.
    pub fn load_or_default(path: &str) -> eyre::Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            tracing::debug!(path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Resolve the config path from CHAINGUARD_CONFIG, then the default file name.
    pub fn resolve_path() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    fn validate(&self) -> eyre::Result<()> {
        let hf = &self.detection.high_frequency;
        if hf.min_transactions < 2 {
            return Err(eyre::eyre!(
                "detection.high_frequency.min_transactions must be at least 2, got {}",
                hf.min_transactions
            ));
        }
        if hf.max_tx_per_minute.is_nan() || hf.max_tx_per_minute <= 0.0 {
            return Err(eyre::eyre!(
                "detection.high_frequency.max_tx_per_minute must be positive, got {}",
                hf.max_tx_per_minute
            ));
        }

        let ratio = self.detection.wash_trading.concentration_ratio;
        if ratio.is_nan() || ratio <= 0.0 || ratio > 1.0 {
            return Err(eyre::eyre!(
                "detection.wash_trading.concentration_ratio must be in (0, 1], got {}",
                ratio
            ));
        }

        if self.fetcher.page_size == 0 {
            return Err(eyre::eyre!("fetcher.page_size must be greater than zero"));
        }
        Ok(())
    }
}
