//! Result Sink Module
//!
//! Append-only tabular outputs for verdicts. Every sink starts with the same fixed
//! header row; each verdict becomes one comma-separated row.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::validator::Verdict;

/// Header row shared by every result file.
pub const RESULT_HEADER: &str = "claimValidity,amountLost,userAddress,contactInfo,notes,sentAmount,receivedAmount,sendTxHash,receiveTxHash,sentDatetime,receivedDatetime,userReportedSentAmount,userReportedReceivedAmount,additionalInfo";

/// Destination for verdict rows.
pub trait ResultSink {
    /// Appends one verdict.
    fn append(&mut self, verdict: &Verdict) -> Result<()>;
}

// ============================================================================
// ROW RENDERING
// ============================================================================

/// Quotes a field when it contains a delimiter, a quote or a line break.
fn escape_field(field: &str) -> String {
    if field.contains(|c| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn opt_text(value: &Option<String>) -> String {
    value.as_deref().map(escape_field).unwrap_or_default()
}

fn opt_amount(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_datetime(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .unwrap_or_default()
}

/// Renders a verdict as one result row, in [`RESULT_HEADER`] column order.
pub fn format_row(verdict: &Verdict) -> String {
    [
        verdict.claim_validity.to_string(),
        opt_amount(verdict.amount_lost),
        opt_text(&verdict.user_address),
        opt_text(&verdict.contact_info),
        escape_field(&verdict.notes),
        verdict.sent_amount.to_string(),
        verdict.received_amount.to_string(),
        opt_text(&verdict.send_tx_hash),
        opt_text(&verdict.receive_tx_hash),
        opt_datetime(verdict.sent_datetime),
        opt_datetime(verdict.received_datetime),
        opt_amount(verdict.user_reported_sent_amount),
        opt_amount(verdict.user_reported_received_amount),
        opt_text(&verdict.additional_info),
    ]
    .join(",")
}

// ============================================================================
// FILE SINK
// ============================================================================

/// Result file on disk.
pub struct CsvFileSink {
    path: PathBuf,
    file: File,
}

impl CsvFileSink {
    /// Creates the file at `path` and writes the header row.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open result file {}", path.display()))?;
        writeln!(file, "{}", RESULT_HEADER)
            .with_context(|| format!("Failed to write header to {}", path.display()))?;
        Ok(Self { path, file })
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for CsvFileSink {
    fn append(&mut self, verdict: &Verdict) -> Result<()> {
        writeln!(self.file, "{}", format_row(verdict))
            .with_context(|| format!("Failed to write to result file {}", self.path.display()))
    }
}

/// The pair of result files written by one run.
pub struct ResultFiles {
    /// Every verdict
    pub all: CsvFileSink,
    /// Only verdicts of valid claims
    pub valid_only: CsvFileSink,
}

impl ResultFiles {
    /// Creates `all-results-<millis>.csv` and `valid-results-<millis>.csv` in `dir`,
    /// creating the directory when missing.
    pub fn create_in(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create results directory {}", dir.display()))?;

        let stamp = Utc::now().timestamp_millis();
        let all = CsvFileSink::create(dir.join(format!("all-results-{}.csv", stamp)))?;
        let valid_only = CsvFileSink::create(dir.join(format!("valid-results-{}.csv", stamp)))?;

        info!(
            "Writing results to {} and {}",
            all.path().display(),
            valid_only.path().display()
        );

        Ok(Self { all, valid_only })
    }
}
