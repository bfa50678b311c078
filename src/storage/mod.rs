//! Storage Module
//!
//! This module provides the in-run state of the claim reconciler: the registry of
//! transaction hashes already used by earlier claims in the batch.

pub mod duplicate_tracker;

// Re-export for convenience
pub use duplicate_tracker::DuplicateTracker;
