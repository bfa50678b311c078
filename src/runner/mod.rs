//! Batch Runner Module
//!
//! Feeds claims to the [`ClaimValidator`] strictly in input order and forwards each
//! verdict to the result sinks. The duplicate tracker lives for exactly one batch;
//! claim N's tracker writes are complete before claim N+1 is validated.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::claims::Claim;
use crate::lookup::TransferLookup;
use crate::sink::ResultSink;
use crate::storage::DuplicateTracker;
use crate::validator::{ClaimValidator, Verdict};

/// Counters describing one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Claims read from the source
    pub total: usize,
    /// Claims judged valid
    pub valid: usize,
    /// Claims judged invalid
    pub invalid: usize,
    /// Claims whose lookups failed, producing no verdict
    pub failed: usize,
    /// Result rows that could not be written
    pub sink_errors: usize,
}

/// Runs the claim validation pipeline over a batch.
pub struct BatchRunner<L> {
    validator: ClaimValidator<L>,
}

impl<L: TransferLookup> BatchRunner<L> {
    /// Creates a runner around a validator.
    pub fn new(validator: ClaimValidator<L>) -> Self {
        Self { validator }
    }

    /// Returns the validator used by this runner
    pub fn validator(&self) -> &ClaimValidator<L> {
        &self.validator
    }

    /// Validates every claim in order and writes the verdicts.
    ///
    /// Every verdict goes to `all_results`; verdicts of valid claims also go to
    /// `valid_results`. Write failures are logged and counted but never stop the
    /// batch. A claim whose lookup fails is logged and skipped.
    ///
    /// # Returns
    ///
    /// The verdicts produced, in input order, and the run summary.
    pub async fn run(
        &self,
        claims: &[Claim],
        all_results: &mut dyn ResultSink,
        valid_results: &mut dyn ResultSink,
    ) -> (Vec<Verdict>, BatchSummary) {
        let mut tracker = DuplicateTracker::new();
        let mut summary = BatchSummary {
            total: claims.len(),
            ..BatchSummary::default()
        };
        let mut verdicts = Vec::with_capacity(claims.len());

        info!("Processing {} claim(s)", claims.len());

        for (index, claim) in claims.iter().enumerate() {
            let verdict = match self.validator.validate(claim, &mut tracker).await {
                Ok(verdict) => verdict,
                Err(e) => {
                    error!(
                        "Claim #{} ({:?}) could not be processed: {:#}",
                        index + 1,
                        claim.claim_id,
                        e
                    );
                    summary.failed += 1;
                    continue;
                }
            };

            if let Err(e) = all_results.append(&verdict) {
                error!("Error writing to result file: {:#}", e);
                summary.sink_errors += 1;
            }

            if verdict.claim_validity {
                summary.valid += 1;
                if let Err(e) = valid_results.append(&verdict) {
                    error!("Error writing to result file: {:#}", e);
                    summary.sink_errors += 1;
                }
            } else {
                summary.invalid += 1;
            }

            verdicts.push(verdict);
        }

        info!(
            "Batch complete: {} valid, {} invalid, {} failed, {} write error(s); {} hash(es) consumed",
            summary.valid,
            summary.invalid,
            summary.failed,
            summary.sink_errors,
            tracker.consumed_count()
        );

        (verdicts, summary)
    }
}
