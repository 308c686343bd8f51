use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::detection::engine::RuleEngine;
use crate::detection::types::Finding;
use crate::ingest::types::InputPayload;
use crate::scoring::explainer;
use crate::scoring::scorer::Scorer;

/// Result of assessing one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub entity_id: String,
    pub risk_score: u32,
    pub findings: Vec<Finding>,
    pub explanation: String,
}

/// Runs the assessment stages in order:
/// 1. Rule evaluation
/// 2. Scoring
/// 3. Explanation
///
/// Holds only immutable policy, so one instance can be shared across threads.
pub struct RiskAnalyzer {
    engine: RuleEngine,
    scorer: Scorer,
}

impl RiskAnalyzer {
    pub fn new(config: &Config) -> Self {
        Self {
            engine: RuleEngine::new(&config.detection),
            scorer: Scorer::new(&config.scoring),
        }
    }

    pub fn rule_count(&self) -> usize {
        self.engine.rule_count()
    }

    pub fn assess(&self, payload: &InputPayload) -> RiskReport {
        let findings = self.engine.analyze(&payload.transactions);
        let risk_score = self.scorer.score(&findings);
        let explanation = explainer::explain(&findings, risk_score);

        for finding in &findings {
            tracing::warn!(
                entity = %payload.entity_id,
                rule_id = %finding.rule_id,
                severity = finding.severity.as_str(),
                metadata = ?finding.metadata,
                "RISK FINDING"
            );
        }

        tracing::info!(
            entity = %payload.entity_id,
            entity_type = payload.entity_type.as_str(),
            chain = %payload.chain,
            transactions = payload.transactions.len(),
            findings = findings.len(),
            risk_score,
            "Entity assessed"
        );

        RiskReport {
            entity_id: payload.entity_id.clone(),
            risk_score,
            findings,
            explanation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::rules::tests::make_tx;
    use crate::ingest::types::EntityType;
    use crate::scoring::explainer::NO_FINDINGS_MESSAGE;

    fn payload(transactions: Vec<crate::ingest::types::Transaction>) -> InputPayload {
        InputPayload {
            entity_type: EntityType::Wallet,
            entity_id: "0xentity".to_string(),
            chain: "polygon".to_string(),
            transactions,
        }
    }

    #[test]
    fn test_clean_account() {
        let analyzer = RiskAnalyzer::new(&Config::default());
        let report = analyzer.assess(&payload(vec![]));
        assert_eq!(report.entity_id, "0xentity");
        assert_eq!(report.risk_score, 0);
        assert!(report.findings.is_empty());
        assert_eq!(report.explanation, NO_FINDINGS_MESSAGE);
    }

    #[test]
    fn test_all_rules_fire() {
        let analyzer = RiskAnalyzer::new(&Config::default());
        let txs = (0..6)
            .map(|i| make_tx("0xentity", "0xpeer", 1_000 + i, Some("transfer")))
            .collect();
        let report = analyzer.assess(&payload(txs));

        // medium 30 + high 60 + low 10
        assert_eq!(report.risk_score, 100);
        assert_eq!(report.findings.len(), 3);
        assert!(report.explanation.starts_with("ChainGuard AI Assessment:\nRisk Score: 100/100"));
        assert!(report
            .explanation
            .contains("- Repeated calls to method 'transfer'."));
    }

    #[test]
    fn test_custom_weights_flow_through() {
        let mut config = Config::default();
        config.scoring.weights.low = 1;
        let analyzer = RiskAnalyzer::new(&config);
        // 6 calls spread over an hour: only the repeated-call rule fires
        let txs = (0..6)
            .map(|i| make_tx(&format!("0x{}", i), "0xpeer", i * 600, Some("transfer")))
            .collect();
        let report = analyzer.assess(&payload(txs));
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.risk_score, 1);
    }

    #[test]
    fn test_partial_weight_table_keeps_medium_weight() {
        let config: Config = toml::from_str("[scoring.weights]\ncritical = 95\n").unwrap();
        let analyzer = RiskAnalyzer::new(&config);
        // 5 transactions between distinct pairs in 4 seconds: only high frequency fires
        let txs = (0..5)
            .map(|i| make_tx(&format!("0x{}", i), &format!("0xpeer{}", i), 100 + i, None))
            .collect();
        let report = analyzer.assess(&payload(txs));
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].rule_id, "HIGH_FREQUENCY");
        assert_eq!(report.risk_score, 30);
    }
}
