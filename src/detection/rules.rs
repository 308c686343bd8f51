use std::collections::BTreeMap;

use crate::config::{
    DetectionConfig, HighFrequencyConfig, RepeatedCallsConfig, WashTradingConfig,
};
use crate::ingest::types::Transaction;

use super::types::{Finding, RuleId, Severity};

/// A heuristic evaluated over one entity's whole transaction set.
/// Returns `None` to abstain. Must not fail on any well-formed set, including an empty one.
pub trait Rule: Send + Sync {
    fn id(&self) -> RuleId;
    fn evaluate(&self, transactions: &[Transaction]) -> Option<Finding>;
}

/// All rules in registration order.
pub fn default_rules(config: &DetectionConfig) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(HighFrequencyRule::new(config.high_frequency.clone())),
        Box::new(WashTradingRule::new(config.wash_trading.clone())),
        Box::new(RepeatedCallsRule::new(config.repeated_calls.clone())),
    ]
}

// --- Individual Rules ---

/// Flags accounts whose average transaction rate over their whole active span
/// exceeds the configured per-minute limit.
pub struct HighFrequencyRule {
    config: HighFrequencyConfig,
}

impl HighFrequencyRule {
    pub fn new(config: HighFrequencyConfig) -> Self {
        Self { config }
    }
}

impl Rule for HighFrequencyRule {
    fn id(&self) -> RuleId {
        RuleId::HighFrequency
    }

    fn evaluate(&self, transactions: &[Transaction]) -> Option<Finding> {
        if transactions.len() < self.config.min_transactions {
            return None;
        }

        let mut timestamps: Vec<i64> = transactions.iter().map(|tx| tx.timestamp).collect();
        timestamps.sort_unstable();

        let (Some(first), Some(last)) = (timestamps.first(), timestamps.last()) else {
            return None;
        };
        let duration = last.saturating_sub(*first);
        // A burst sharing one timestamp has no measurable rate.
        if duration <= 0 {
            return None;
        }

        let rate = timestamps.len() as f64 / duration as f64;
        if rate > self.config.max_tx_per_minute / 60.0 {
            return Some(
                Finding::new(
                    self.id(),
                    Severity::Medium,
                    "Unusually high transaction frequency detected (potential bot).",
                )
                .with_metadata("tx_rate_per_sec", rate),
            );
        }

        None
    }
}

/// Flags accounts where one address pair, regardless of direction, carries
/// most of the traffic.
pub struct WashTradingRule {
    config: WashTradingConfig,
}

impl WashTradingRule {
    pub fn new(config: WashTradingConfig) -> Self {
        Self { config }
    }
}

impl Rule for WashTradingRule {
    fn id(&self) -> RuleId {
        RuleId::WashTrading
    }

    fn evaluate(&self, transactions: &[Transaction]) -> Option<Finding> {
        if transactions.is_empty() {
            return None;
        }

        // Keyed by (lower, higher) address so A->B and B->A share a group.
        let mut pairs: BTreeMap<(&str, &str), usize> = BTreeMap::new();
        for tx in transactions {
            let (a, b) = (tx.from_addr.as_str(), tx.to_addr.as_str());
            let key = if a <= b { (a, b) } else { (b, a) };
            *pairs.entry(key).or_insert(0) += 1;
        }

        let total = transactions.len() as f64;
        let qualifying = pairs.values().copied().find(|&count| {
            count > self.config.min_pair_count
                && count as f64 > total * self.config.concentration_ratio
        })?;

        Some(
            Finding::new(
                self.id(),
                Severity::High,
                "High concentration of transactions between same addresses.",
            )
            .with_metadata("repeated_pair_count", qualifying),
        )
    }
}

/// Flags the first contract method, in name order, invoked more often than allowed.
pub struct RepeatedCallsRule {
    config: RepeatedCallsConfig,
}

impl RepeatedCallsRule {
    pub fn new(config: RepeatedCallsConfig) -> Self {
        Self { config }
    }
}

impl Rule for RepeatedCallsRule {
    fn id(&self) -> RuleId {
        RuleId::RepeatedContractCalls
    }

    fn evaluate(&self, transactions: &[Transaction]) -> Option<Finding> {
        let mut method_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for method in transactions.iter().filter_map(|tx| tx.method.as_deref()) {
            if method.is_empty() {
                continue;
            }
            *method_counts.entry(method).or_insert(0) += 1;
        }

        let (method, count) = method_counts
            .into_iter()
            .find(|&(_, count)| count > self.config.max_calls_per_method)?;

        Some(
            Finding::new(
                self.id(),
                Severity::Low,
                format!("Repeated calls to method '{}'.", method),
            )
            .with_metadata("method", method)
            .with_metadata("count", count),
        )
    }
}
