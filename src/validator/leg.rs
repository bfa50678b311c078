//! Leg verification (chain-agnostic)
//!
//! One bridge claim has two legs: the outbound send on the source chain and the
//! inbound payout on the destination chain. Both are verified by the same
//! algorithm, parameterized by the leg's [`LegConfig`] filter rules.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use super::generic::{addresses_match, LegResult};
use crate::config::{LegConfig, LegDirection};
use crate::lookup::{TransferLookup, TransferQuery, TransferRecord};

/// Canonical values extracted from the transfer records of one transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferSelection {
    /// Largest amount among the usable records
    pub amount: f64,
    /// Timestamp of the last usable record
    pub datetime: Option<DateTime<Utc>>,
    /// Counterparty of the last usable record
    pub counterparty: Option<String>,
}

/// Returns the addresses identifying the counterparty of a record for `direction`.
fn counterparty_addresses(record: &TransferRecord, direction: LegDirection) -> &[String] {
    match direction {
        LegDirection::Outbound => &record.operator_addresses,
        LegDirection::Inbound => &record.to_addresses,
    }
}

/// Picks the canonical amount, timestamp and counterparty from lookup records.
///
/// Only records with a timestamp, a non-zero amount and at least one counterparty
/// address are usable. The amount is the maximum over usable records, while the
/// timestamp and counterparty come from the last usable record in response order,
/// so the two may originate from different records.
pub fn select_transfer(records: &[TransferRecord], direction: LegDirection) -> TransferSelection {
    let mut selection = TransferSelection::default();

    for record in records {
        let addresses = counterparty_addresses(record, direction);
        let (Some(timestamp), Some(amount)) = (record.block_timestamp, record.formatted_amount) else {
            continue;
        };
        if amount == 0.0 || addresses.is_empty() {
            continue;
        }

        selection.datetime = Some(timestamp);
        if amount > selection.amount {
            selection.amount = amount;
        }
        selection.counterparty = Some(addresses[0].clone());
    }

    selection
}

/// Verifies one leg of a claim against the transfer lookup.
pub struct LegVerifier<L> {
    /// Filter rules and labels for this leg
    config: LegConfig,
    /// Prefix every transaction hash must carry
    hash_prefix: String,
    /// Transfer data source
    lookup: Arc<L>,
}

impl<L: TransferLookup> LegVerifier<L> {
    /// Creates a verifier for the leg described by `config`.
    pub fn new(config: LegConfig, hash_prefix: impl Into<String>, lookup: Arc<L>) -> Self {
        Self {
            config,
            hash_prefix: hash_prefix.into(),
            lookup,
        }
    }

    /// Returns the leg configuration
    pub fn config(&self) -> &LegConfig {
        &self.config
    }

    /// Builds the lookup filter for this leg.
    ///
    /// Outbound legs filter on the configured destination (pool/router). Inbound legs
    /// filter on the claimed user as recipient, plus the configured token and relayer.
    pub fn build_query(&self, user_address: &str, tx_hash: &str) -> TransferQuery {
        let to = match self.config.direction {
            LegDirection::Outbound => self.config.to_address.clone(),
            LegDirection::Inbound => Some(user_address.to_string()),
        };

        TransferQuery {
            blockchain: self.config.blockchain.clone(),
            transaction_hash: tx_hash.to_string(),
            token_address: self.config.token_address.clone(),
            from: self.config.from_address.clone(),
            to,
        }
    }

    /// Verifies a leg of a claim.
    ///
    /// Format failures return immediately without querying. Once records are found,
    /// an address mismatch still returns the extracted amount and timestamp.
    ///
    /// # Arguments
    ///
    /// * `user_address` - Wallet address from the claim
    /// * `tx_hash` - Transaction hash claimed for this leg
    ///
    /// # Returns
    ///
    /// * `Ok(LegResult)` - Verification outcome with notes
    /// * `Err(anyhow::Error)` - The lookup itself failed
    pub async fn verify(&self, user_address: Option<&str>, tx_hash: Option<&str>) -> Result<LegResult> {
        let label = &self.config.label;

        let tx_hash = match tx_hash.map(str::trim).filter(|h| !h.is_empty()) {
            Some(hash) => hash,
            None => {
                return Ok(LegResult::rejected(format!(
                    "No {} transaction hash provided.",
                    label
                )))
            }
        };

        if !tx_hash.starts_with(&self.hash_prefix) {
            return Ok(LegResult::rejected(format!(
                "Invalid {} transaction hash.",
                label
            )));
        }

        let query = self.build_query(user_address.unwrap_or_default(), tx_hash);
        let records = self
            .lookup
            .lookup(&query)
            .await
            .with_context(|| format!("Failed to look up {} transaction {}", label, tx_hash))?;

        debug!("{} lookup for {} returned {} record(s)", label, tx_hash, records.len());

        if records.is_empty() {
            return Ok(LegResult::rejected(format!("No {} transaction found.", label)));
        }

        let selection = select_transfer(&records, self.config.direction);

        let mut result = LegResult {
            amount: selection.amount,
            datetime: selection.datetime,
            valid: true,
            notes: Vec::new(),
        };

        let matches = match (user_address, selection.counterparty.as_deref()) {
            (Some(user), Some(counterparty)) => addresses_match(user, counterparty),
            _ => false,
        };

        if !matches {
            info!(
                "{} counterparty {:?} does not match claimed address {:?} for tx {}",
                label, selection.counterparty, user_address, tx_hash
            );
            result.valid = false;
            result.notes.push(format!(
                "User address in {} transaction does not match user address in the form.",
                label
            ));
        }

        Ok(result)
    }
}
