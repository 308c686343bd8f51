use crate::config::{ScoringConfig, SeverityWeights};
use crate::detection::types::{Finding, Severity};

/// Upper bound of the aggregate risk score.
pub const MAX_RISK_SCORE: u32 = 100;

/// Maps findings to a bounded integer risk score by severity-weighted summation.
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: SeverityWeights,
}

impl Scorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            weights: config.weights.clone(),
        }
    }

    pub fn weight(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Low => self.weights.low,
            Severity::Medium => self.weights.medium,
            Severity::High => self.weights.high,
            Severity::Critical => self.weights.critical,
        }
    }

    /// Sum of finding weights, capped at [`MAX_RISK_SCORE`].
    pub fn score(&self, findings: &[Finding]) -> u32 {
        let total = findings
            .iter()
            .fold(0u32, |acc, f| acc.saturating_add(self.weight(f.severity)));
        total.min(MAX_RISK_SCORE)
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::RuleId;
    use proptest::prelude::*;

    fn make_finding(severity: Severity) -> Finding {
        Finding::new(RuleId::HighFrequency, severity, "test")
    }

    #[test]
    fn empty_findings() {
        assert_eq!(Scorer::default().score(&[]), 0);
    }

    #[test]
    fn default_weights() {
        let scorer = Scorer::default();
        assert_eq!(scorer.score(&[make_finding(Severity::Low)]), 10);
        assert_eq!(scorer.score(&[make_finding(Severity::Medium)]), 30);
        assert_eq!(scorer.score(&[make_finding(Severity::High)]), 60);
        assert_eq!(scorer.score(&[make_finding(Severity::Critical)]), 90);
    }

    #[test]
    fn sums_without_dedup() {
        let scorer = Scorer::default();
        let findings = vec![make_finding(Severity::Medium), make_finding(Severity::Medium)];
        assert_eq!(scorer.score(&findings), 60);
    }

    #[test]
    fn two_high_findings_clamp_to_100() {
        let scorer = Scorer::default();
        let findings = vec![make_finding(Severity::High), make_finding(Severity::High)];
        assert_eq!(scorer.score(&findings), 100);
    }

    #[test]
    fn tuning_one_severity_keeps_the_others() {
        let config: crate::config::Config =
            toml::from_str("[scoring.weights]\ncritical = 95\n").unwrap();
        let scorer = Scorer::new(&config.scoring);
        assert_eq!(scorer.weight(Severity::Critical), 95);
        assert_eq!(scorer.score(&[make_finding(Severity::Medium)]), 30);
        assert_eq!(scorer.score(&[make_finding(Severity::High)]), 60);
    }

    fn arb_severity() -> impl Strategy<Value = Severity> {
        prop::sample::select(vec![
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ])
    }

    proptest! {
        #[test]
        fn prop_score_is_clamped_sum(severities in prop::collection::vec(arb_severity(), 0..12)) {
            let scorer = Scorer::default();
            let findings: Vec<_> = severities.iter().map(|s| make_finding(*s)).collect();
            let expected: u32 = severities.iter().map(|s| scorer.weight(*s)).sum::<u32>().min(100);
            prop_assert_eq!(scorer.score(&findings), expected);

            let mut reversed = findings.clone();
            reversed.reverse();
            prop_assert_eq!(scorer.score(&reversed), expected);
        }
    }
}
