//! Claim Source Module
//!
//! Parses the comma-separated claim export into [`Claim`] records. Each row has a
//! fixed column order; a header row comes first.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// A user's self-reported bridging action, as submitted.
///
/// Fields are kept as submitted apart from whitespace and quote stripping.
/// Uniqueness is not enforced here; reused hashes are a validity concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: Option<String>,
    /// Wallet the user claims to have bridged from and to
    pub wallet_address: Option<String>,
    /// Amount the user reports sending on the source chain
    pub send_amount: Option<f64>,
    /// Source-chain transaction hash
    pub send_tx_hash: Option<String>,
    /// Amount the user reports receiving on the destination chain
    pub receive_amount: Option<f64>,
    /// Destination-chain transaction hash
    pub receive_tx_hash: Option<String>,
    pub contact_info: Option<String>,
    pub additional_info: Option<String>,
    pub response_type: Option<String>,
    pub start_date: Option<String>,
    pub stage_date: Option<String>,
    pub submit_date: Option<String>,
    pub network_id: Option<String>,
    pub tags: Option<String>,
}

/// Trims a field and removes one leading and one trailing `"` or `'`.
pub fn strip_quotes(field: &str) -> String {
    let trimmed = field.trim();
    let trimmed = trimmed
        .strip_prefix('"')
        .or_else(|| trimmed.strip_prefix('\''))
        .unwrap_or(trimmed);
    let trimmed = trimmed
        .strip_suffix('"')
        .or_else(|| trimmed.strip_suffix('\''))
        .unwrap_or(trimmed);
    trimmed.to_string()
}

fn raw(field: Option<&str>) -> Option<String> {
    field.map(str::trim).filter(|f| !f.is_empty()).map(str::to_string)
}

fn text(field: Option<&str>) -> Option<String> {
    field.map(strip_quotes).filter(|f| !f.is_empty())
}

fn amount(field: Option<&str>, column: &str) -> Option<f64> {
    let value = field.map(strip_quotes).filter(|f| !f.is_empty())?;
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            debug!("Ignoring unparsable {} '{}'", column, value);
            None
        }
    }
}

/// Parses a single claim row.
///
/// Columns: claim id, wallet address, send amount, send tx hash, receive amount,
/// receive tx hash, contact info, additional info, response type, start date,
/// stage date, submit date, network id, tags. Missing trailing columns are absent.
pub fn parse_row(line: &str) -> Claim {
    let mut cols = line.split(',');
    let mut next = || cols.next();

    Claim {
        claim_id: raw(next()),
        wallet_address: text(next()),
        send_amount: amount(next(), "send amount"),
        send_tx_hash: text(next()),
        receive_amount: amount(next(), "receive amount"),
        receive_tx_hash: text(next()),
        contact_info: text(next()),
        additional_info: text(next()),
        response_type: raw(next()),
        start_date: raw(next()),
        stage_date: raw(next()),
        submit_date: raw(next()),
        network_id: raw(next()),
        tags: raw(next()),
    }
}

/// Parses a whole claim export: the first line is a header, blank lines are skipped.
pub fn parse_claims(content: &str) -> Vec<Claim> {
    content
        .lines()
        .skip(1)
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(parse_row)
        .collect()
}

/// Reads and parses the claim export at `path`.
pub fn load_claims(path: impl AsRef<Path>) -> Result<Vec<Claim>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read claim file {}", path.display()))?;
    let claims = parse_claims(&content);
    info!("Number of claims: {}", claims.len());
    Ok(claims)
}
