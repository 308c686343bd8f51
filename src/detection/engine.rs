use crate::config::DetectionConfig;
use crate::ingest::types::Transaction;

use super::rules::{self, Rule};
use super::types::Finding;

/// The rule engine. Runs every registered rule once against a transaction set.
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleEngine {
    pub fn new(config: &DetectionConfig) -> Self {
        Self::with_rules(rules::default_rules(config))
    }

    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Evaluate all rules in registration order.
    /// Returns one finding per rule that did not abstain, in that same order.
    pub fn analyze(&self, transactions: &[Transaction]) -> Vec<Finding> {
        let mut findings = Vec::new();

        for rule in &self.rules {
            match rule.evaluate(transactions) {
                Some(finding) => findings.push(finding),
                None => tracing::debug!(rule_id = rule.id().as_str(), "Rule abstained"),
            }
        }

        findings
    }
}
