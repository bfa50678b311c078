//! Claim Validation Module
//!
//! This module decides whether a bridging claim is legitimate. It verifies both legs
//! of the bridge against on-chain transfer records, cross-checks them, and tracks
//! transaction hash reuse across the batch.
//!
//! The module is organized as:
//! - `generic` - Shared result types and address/hash format helpers
//! - `leg` - Verification of a single leg against the transfer lookup
//! - `claim` - The ordered per-claim check pipeline

pub mod claim;
pub mod generic;
pub mod leg;

// Re-export commonly used types
pub use claim::ClaimValidator;
pub use generic::{
    addresses_match, is_valid_address, normalize_tx_hash, to_checksum_address,
    validate_address_format, LegResult, Verdict,
};
pub use leg::{select_transfer, LegVerifier, TransferSelection};
