//! Duplicate Tracker Module
//!
//! In-memory registry of transaction hashes consumed by earlier claims of the same
//! batch. Hashes from valid claims block later claims; hashes from invalid claims
//! only produce an informational note. Nothing here survives the process.

use std::collections::HashSet;

use crate::validator::generic::normalize_tx_hash;

// ============================================================================
// STORAGE IMPLEMENTATION
// ============================================================================

/// Registry of transaction hashes seen so far in a batch.
///
/// Hashes are compared case-insensitively. Absent or blank hashes are never
/// recorded and never match. Both sets only grow.
#[derive(Debug, Default, Clone)]
pub struct DuplicateTracker {
    /// Hashes used by a claim that was accepted
    consumed_by_valid: HashSet<String>,
    /// Hashes used by a claim that was rejected
    seen_in_invalid: HashSet<String>,
}

impl DuplicateTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `hash` was used by an earlier valid claim.
    pub fn is_consumed_valid(&self, hash: Option<&str>) -> bool {
        normalize_tx_hash(hash).map_or(false, |h| self.consumed_by_valid.contains(&h))
    }

    /// Whether `hash` was used by an earlier invalid claim.
    pub fn is_seen_invalid(&self, hash: Option<&str>) -> bool {
        normalize_tx_hash(hash).map_or(false, |h| self.seen_in_invalid.contains(&h))
    }

    /// Record `hash` as consumed by a valid claim.
    pub fn record_valid(&mut self, hash: Option<&str>) {
        if let Some(h) = normalize_tx_hash(hash) {
            self.consumed_by_valid.insert(h);
        }
    }

    /// Record `hash` as used by an invalid claim.
    pub fn record_invalid(&mut self, hash: Option<&str>) {
        if let Some(h) = normalize_tx_hash(hash) {
            self.seen_in_invalid.insert(h);
        }
    }

    /// Number of distinct hashes consumed by valid claims.
    pub fn consumed_count(&self) -> usize {
        self.consumed_by_valid.len()
    }

    /// Number of distinct hashes seen in invalid claims.
    pub fn seen_invalid_count(&self) -> usize {
        self.seen_in_invalid.len()
    }
}
