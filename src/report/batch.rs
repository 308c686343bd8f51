use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ingest::types::InputPayload;
use crate::pipeline::{RiskAnalyzer, RiskReport};

/// One CSV row per assessed entity.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRow {
    pub source: String,
    pub entity_id: String,
    pub entity_type: String,
    pub chain: String,
    pub transactions: usize,
    pub risk_score: u32,
    pub findings: usize,
    /// Rule ids joined with ';'.
    pub rule_ids: String,
    pub analyzed_at: DateTime<Utc>,
}

impl BatchRow {
    pub fn new(source: &str, payload: &InputPayload, report: &RiskReport) -> Self {
        Self {
            source: source.to_string(),
            entity_id: report.entity_id.clone(),
            entity_type: payload.entity_type.as_str().to_string(),
            chain: payload.chain.clone(),
            transactions: payload.transactions.len(),
            risk_score: report.risk_score,
            findings: report.findings.len(),
            rule_ids: report
                .findings
                .iter()
                .map(|f| f.rule_id.as_str())
                .collect::<Vec<_>>()
                .join(";"),
            analyzed_at: Utc::now(),
        }
    }
}

/// Assess every payload file independently and in parallel.
/// Rows come back in input order; the first unreadable file aborts the batch.
pub async fn assess_files(
    analyzer: Arc<RiskAnalyzer>,
    paths: &[PathBuf],
) -> eyre::Result<Vec<BatchRow>> {
    let tasks = paths.iter().cloned().map(|path| {
        let analyzer = Arc::clone(&analyzer);
        tokio::task::spawn_blocking(move || -> eyre::Result<BatchRow> {
            let payload = InputPayload::from_file(&path)?;
            let report = analyzer.assess(&payload);
            Ok(BatchRow::new(&path.display().to_string(), &payload, &report))
        })
    });

    let mut rows = Vec::with_capacity(paths.len());
    for joined in futures::future::join_all(tasks).await {
        let row = joined.map_err(|e| eyre::eyre!("Batch task panicked: {}", e))??;
        rows.push(row);
    }

    tracing::info!(
        entities = rows.len(),
        flagged = rows.iter().filter(|r| r.risk_score > 0).count(),
        "Batch assessment complete"
    );
    Ok(rows)
}

pub fn write_csv<W: Write>(writer: W, rows: &[BatchRow]) -> eyre::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_file(path: impl AsRef<Path>, rows: &[BatchRow]) -> eyre::Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .map_err(|e| eyre::eyre!("Failed to create report '{}': {}", path.display(), e))?;
    write_csv(file, rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "Batch report written");
    Ok(())
}
