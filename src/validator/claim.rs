//! Claim validation pipeline
//!
//! Runs every check on one claim in a fixed order and folds the findings into a
//! single [`Verdict`]. Hard checks flip the claim to invalid; soft checks only add
//! notes. Leg verification always runs, even when a cheaper check has already
//! failed, so every verdict carries both leg results and all notes.

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use super::generic::{is_valid_address, LegResult, Verdict};
use super::leg::LegVerifier;
use crate::claims::Claim;
use crate::config::{Config, LegConfig, ReconcilerConfig};
use crate::lookup::TransferLookup;
use crate::storage::DuplicateTracker;

/// Validates claims against both bridge legs.
pub struct ClaimValidator<L> {
    /// Verifier for the source-chain send
    send_leg: LegVerifier<L>,
    /// Verifier for the destination-chain payout
    receive_leg: LegVerifier<L>,
    /// Tolerances
    settings: ReconcilerConfig,
}

impl<L: TransferLookup> ClaimValidator<L> {
    /// Creates a validator from the configuration, sharing one lookup between both legs.
    pub fn new(config: &Config, lookup: Arc<L>) -> Self {
        let prefix = &config.reconciler.hash_prefix;
        Self {
            send_leg: LegVerifier::new(config.send_leg.clone(), prefix.clone(), Arc::clone(&lookup)),
            receive_leg: LegVerifier::new(config.receive_leg.clone(), prefix.clone(), lookup),
            settings: config.reconciler.clone(),
        }
    }

    /// Returns the reconciliation tolerances in use
    pub fn settings(&self) -> &ReconcilerConfig {
        &self.settings
    }

    /// Validates one claim and updates the duplicate tracker with its outcome.
    ///
    /// Checks, in order:
    /// 1. Either hash already consumed by a valid claim (hard)
    /// 2. Either hash seen in an invalid claim (soft, only while still valid)
    /// 3. Wallet address syntax (hard)
    /// 4. Send leg verification (hard)
    /// 5. Receive leg verification (hard)
    /// 6. Reported send amount within tolerance (soft)
    /// 7. Reported receive amount within tolerance (soft)
    /// 8. Send and receive timestamps within the configured delta (hard); an
    ///    unresolved timestamp counts as the Unix epoch
    ///
    /// # Returns
    ///
    /// * `Ok(Verdict)` - Decision for the claim
    /// * `Err(anyhow::Error)` - A leg lookup failed; the tracker is left untouched
    pub async fn validate(&self, claim: &Claim, tracker: &mut DuplicateTracker) -> Result<Verdict> {
        let send_label = &self.send_leg.config().label;
        let receive_label = &self.receive_leg.config().label;
        let send_hash = claim.send_tx_hash.as_deref();
        let receive_hash = claim.receive_tx_hash.as_deref();

        let mut notes: Vec<String> = Vec::new();
        let mut valid = true;

        // Hashes consumed by an earlier valid claim
        if tracker.is_consumed_valid(send_hash) {
            notes.push(format!(
                "This claim transaction hash on {} has already been processed in a previous valid claim.",
                send_label
            ));
            valid = false;
        }
        if tracker.is_consumed_valid(receive_hash) {
            notes.push(format!(
                "This claim transaction hash on {} has already been processed in a previous valid claim.",
                receive_label
            ));
            valid = false;
        }

        // Hashes used by an earlier rejected claim do not block this one
        if valid && tracker.is_seen_invalid(send_hash) {
            notes.push(previous_invalid_note(send_label));
        }
        if valid && tracker.is_seen_invalid(receive_hash) {
            notes.push(previous_invalid_note(receive_label));
        }

        let wallet = claim.wallet_address.as_deref();
        if !wallet.map_or(false, is_valid_address) {
            notes.push("Invalid wallet address.".to_string());
            valid = false;
        }

        // Both lookups are independent; the verdict waits for both
        let (sent, received) = futures::join!(
            self.send_leg.verify(wallet, send_hash),
            self.receive_leg.verify(wallet, receive_hash)
        );
        let sent = sent?;
        let received = received?;

        notes.extend(sent.notes.iter().cloned());
        valid &= sent.valid;
        notes.extend(received.notes.iter().cloned());
        valid &= received.valid;

        if let Some(note) = self.amount_note(&sent, claim.send_amount, &self.send_leg, "sent") {
            notes.push(note);
        }
        if let Some(note) =
            self.amount_note(&received, claim.receive_amount, &self.receive_leg, "received")
        {
            notes.push(note);
        }

        // An unresolved leg counts as the Unix epoch
        let sent_at = sent.datetime.unwrap_or_default();
        let received_at = received.datetime.unwrap_or_default();
        let delta_ms = (sent_at - received_at).num_milliseconds().unsigned_abs();
        let allowed_ms = self.settings.timestamp_delta_secs.saturating_mul(1000);
        if delta_ms > allowed_ms {
            notes.push(format!(
                "Timestamp difference between {} and {} transactions is greater than {} seconds. This means these two txs may not be part of the same bridging action.",
                send_label, receive_label, self.settings.timestamp_delta_secs
            ));
            valid = false;
        }

        if valid {
            tracker.record_valid(send_hash);
            tracker.record_valid(receive_hash);
        } else {
            tracker.record_invalid(send_hash);
            tracker.record_invalid(receive_hash);
        }

        let amount_lost = valid.then(|| sent.amount - received.amount);

        let notes = notes.join(" ");
        if valid {
            info!(
                "Claim {:?} is valid, amount lost {:?}",
                claim.claim_id, amount_lost
            );
        } else {
            info!("Claim {:?} is invalid: {}", claim.claim_id, notes);
        }
        debug!("Claim {:?} legs: sent={:?} received={:?}", claim.claim_id, sent, received);

        Ok(Verdict {
            claim_id: claim.claim_id.clone(),
            claim_validity: valid,
            amount_lost,
            user_address: claim.wallet_address.clone(),
            contact_info: claim.contact_info.clone(),
            notes,
            sent_amount: sent.amount,
            received_amount: received.amount,
            send_tx_hash: claim.send_tx_hash.clone(),
            receive_tx_hash: claim.receive_tx_hash.clone(),
            sent_datetime: sent.datetime,
            received_datetime: received.datetime,
            user_reported_sent_amount: claim.send_amount,
            user_reported_received_amount: claim.receive_amount,
            additional_info: claim.additional_info.clone(),
        })
    }

    /// Note for a reported amount deviating from the on-chain amount by more than
    /// the tolerance. A missing reported amount counts as zero.
    fn amount_note(
        &self,
        leg: &LegResult,
        reported: Option<f64>,
        verifier: &LegVerifier<L>,
        verb: &str,
    ) -> Option<String> {
        let reported = reported.unwrap_or(0.0);
        let tolerance = self.settings.amount_tolerance;
        if (leg.amount - reported).abs() <= tolerance * reported {
            return None;
        }

        let LegConfig {
            label, token_symbol, ..
        } = verifier.config();
        Some(format!(
            "User reported {} amount {} on {} is off by more than {}%.",
            token_symbol,
            verb,
            label,
            format_percent(tolerance)
        ))
    }
}

fn previous_invalid_note(label: &str) -> String {
    format!(
        "There is a previous non-valid claim with the same transaction hash on {}. But because that claim was not valid this one could still be valid.",
        label
    )
}

/// Renders a ratio as a percentage without trailing zeros (0.1 → "10").
fn format_percent(ratio: f64) -> String {
    let percent = (ratio * 100.0 * 1000.0).round() / 1000.0;
    format!("{}", percent)
}
