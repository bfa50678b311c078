//! Bridge Claim Reconciler Library
//!
//! This crate reconciles user-submitted cross-chain bridging claims against on-chain
//! transfer records. Each claim is checked on both legs of the bridge, cross-checked
//! for consistency, and deduplicated against earlier claims of the same batch.

pub mod claims;
pub mod config;
pub mod lookup;
pub mod runner;
pub mod sink;
pub mod storage;
pub mod validator;

// Re-export commonly used types
pub use claims::Claim;
pub use config::{Config, LegConfig, LegDirection, LookupConfig, ReconcilerConfig};
pub use lookup::{AirstackClient, TransferLookup, TransferQuery, TransferRecord};
pub use runner::{BatchRunner, BatchSummary};
pub use sink::{CsvFileSink, ResultSink};
pub use storage::DuplicateTracker;
pub use validator::{ClaimValidator, LegResult, LegVerifier, Verdict};
