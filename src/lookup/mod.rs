//! Chain Transfer Lookup Module
//!
//! Query interface to an indexed source of token transfers. A lookup takes a
//! blockchain identifier, a transaction hash and optional token/counterparty
//! filters and returns every matching transfer record in response order.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;

pub mod airstack;

pub use airstack::{AirstackClient, LookupError};

/// Filter for a token transfer query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferQuery {
    /// Blockchain identifier understood by the indexer (e.g. "base")
    pub blockchain: String,
    /// Transaction hash the transfers must belong to
    pub transaction_hash: String,
    /// Token contract the transfers must be of
    pub token_address: Option<String>,
    /// Sender the transfers must come from
    pub from: Option<String>,
    /// Recipient the transfers must go to
    pub to: Option<String>,
}

/// One token transfer log entry as reported by the indexer.
///
/// Fields the indexer left empty or that could not be parsed are `None`/empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Timestamp of the block containing the transfer
    pub block_timestamp: Option<DateTime<Utc>>,
    /// Transfer amount in whole-token units
    pub formatted_amount: Option<f64>,
    /// Addresses of the recipient identity
    pub to_addresses: Vec<String>,
    /// Addresses of the identity that executed the transfer
    pub operator_addresses: Vec<String>,
}

/// Source of on-chain token transfer records.
pub trait TransferLookup {
    /// Returns every transfer matching `query`, in the order the source reports them.
    ///
    /// An empty vector means no matching transfer exists; transport and service
    /// failures are returned as errors.
    fn lookup(&self, query: &TransferQuery)
        -> impl Future<Output = Result<Vec<TransferRecord>>> + Send;
}
