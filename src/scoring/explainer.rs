use crate::detection::types::Finding;

/// Returned verbatim when no rule produced a finding.
pub const NO_FINDINGS_MESSAGE: &str =
    "No suspicious activity detected. The account appears to be behaving normally.";

const HEADER: &str = "ChainGuard AI Assessment:";
const FINDINGS_INTRO: &str = "Analysis detected potentially suspicious behavioral patterns:";
// Wording kept verbatim from the published report template, lowercase "users" included.
const CLOSING: &str = "Summary:\nThe observed activity triggers multiple risk indicators. users are advised to exercise caution.";

/// Render findings and score as a plain-text summary.
/// Deterministic template fill; the score is echoed, never re-derived.
pub fn explain(findings: &[Finding], risk_score: u32) -> String {
    if findings.is_empty() {
        return NO_FINDINGS_MESSAGE.to_string();
    }

    let reasons = findings
        .iter()
        .map(|f| format!("- {}", f.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\nRisk Score: {}/100\n\n{}\n{}\n\n{}",
        HEADER, risk_score, FINDINGS_INTRO, reasons, CLOSING
    )
}
