//! Generic validation structures and format helpers
//!
//! This module contains the validation structures shared by the leg verifier and the
//! claim validator, plus address and transaction hash format checks.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

// ============================================================================
// ADDRESS VALIDATION UTILITIES
// ============================================================================

/// Validates that an address is a 0x-prefixed 20-byte hex string.
///
/// Used for configured filter addresses, where casing carries no meaning.
///
/// # Arguments
///
/// * `address` - Address string to validate
///
/// # Returns
///
/// * `Ok(())` - Address format is valid
/// * `Err(anyhow::Error)` - Address format is invalid
pub fn validate_address_format(address: &str) -> Result<()> {
    let address_no_prefix = address.strip_prefix("0x").ok_or_else(|| {
        anyhow::anyhow!("Invalid EVM address format: missing 0x prefix. Address: '{}'", address)
    })?;

    if address_no_prefix.len() != 40 {
        return Err(anyhow::anyhow!(
            "Invalid EVM address format: expected 20 bytes (40 hex chars), got {} chars. Address: '{}'",
            address_no_prefix.len(),
            address
        ));
    }

    if hex::decode(address_no_prefix).is_err() {
        return Err(anyhow::anyhow!(
            "Invalid address format: contains non-hexadecimal characters. Address: '{}'",
            address
        ));
    }

    Ok(())
}

/// Returns true when `address` is a syntactically valid wallet address.
///
/// Accepts 40 hex characters with an optional lowercase `0x` prefix. All-lowercase and
/// all-uppercase forms are accepted as is; mixed-case forms must carry a valid
/// EIP-55 checksum.
pub fn is_valid_address(address: &str) -> bool {
    let body = address.strip_prefix("0x").unwrap_or(address);

    if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return true;
    }

    to_checksum_address(body).trim_start_matches("0x") == body
}

/// Returns the EIP-55 checksummed form of a 20-byte hex address.
///
/// The input may carry a `0x` prefix and any casing; it must already be 40 hex chars.
pub fn to_checksum_address(address: &str) -> String {
    let lower = address.strip_prefix("0x").unwrap_or(address).to_lowercase();
    let hash = Keccak256::digest(lower.as_bytes());

    let checksummed: String = lower
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect();

    format!("0x{}", checksummed)
}

/// Case-insensitive address comparison.
pub fn addresses_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Normalizes a transaction hash for duplicate tracking.
///
/// Returns `None` for absent or blank hashes, which are never tracked.
pub fn normalize_tx_hash(hash: Option<&str>) -> Option<String> {
    hash.map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_lowercase)
}

// ============================================================================
// VALIDATION DATA STRUCTURES
// ============================================================================

/// Outcome of verifying one leg of a claim against on-chain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegResult {
    /// Canonical on-chain amount (0 if unresolved)
    pub amount: f64,
    /// Block timestamp of the selected transfer record
    pub datetime: Option<DateTime<Utc>>,
    /// Whether the leg passed every check
    pub valid: bool,
    /// Diagnostic notes produced for this leg
    pub notes: Vec<String>,
}

impl LegResult {
    /// An invalid, unresolved leg carrying a single note.
    pub fn rejected(note: String) -> Self {
        Self {
            amount: 0.0,
            datetime: None,
            valid: false,
            notes: vec![note],
        }
    }
}

/// Final decision for one claim, echoing the claim and both leg results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Identifier of the claim row
    pub claim_id: Option<String>,
    /// Whether the claim is legitimate
    pub claim_validity: bool,
    /// Sent minus received on-chain amount; present only for valid claims
    pub amount_lost: Option<f64>,
    /// Wallet address from the claim
    pub user_address: Option<String>,
    /// Contact information from the claim
    pub contact_info: Option<String>,
    /// Consolidated notes for every check that fired
    pub notes: String,
    /// Canonical on-chain amount of the send leg
    pub sent_amount: f64,
    /// Canonical on-chain amount of the receive leg
    pub received_amount: f64,
    /// Send-leg transaction hash from the claim
    pub send_tx_hash: Option<String>,
    /// Receive-leg transaction hash from the claim
    pub receive_tx_hash: Option<String>,
    /// Send-leg block timestamp
    pub sent_datetime: Option<DateTime<Utc>>,
    /// Receive-leg block timestamp
    pub received_datetime: Option<DateTime<Utc>>,
    /// Send amount reported by the user
    pub user_reported_sent_amount: Option<f64>,
    /// Receive amount reported by the user
    pub user_reported_received_amount: Option<f64>,
    /// Free text from the claim
    pub additional_info: Option<String>,
}
