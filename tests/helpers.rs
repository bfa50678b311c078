//! Shared test helpers
//!
//! The module is organized into several categories:
//! - **Constants**: Dummy addresses, hashes and timestamps
//! - **Configuration Builders**: Test configurations
//! - **Transfer Lookup Double**: In-memory lookup keyed by chain and transaction hash
//! - **Sink Doubles**: In-memory and failing result sinks
//! - **Default Record Creators**: Claims and transfer records

#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use bridge_claim_reconciler::config::Config;
use bridge_claim_reconciler::lookup::{TransferLookup, TransferQuery, TransferRecord};
use bridge_claim_reconciler::sink::ResultSink;
use bridge_claim_reconciler::validator::{ClaimValidator, Verdict};
use bridge_claim_reconciler::Claim;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Claimant wallet (all lowercase, no checksum needed)
pub const DUMMY_USER_ADDR: &str = "0x1111111111111111111111111111111111111111";

/// A different wallet
pub const DUMMY_OTHER_ADDR: &str = "0x2222222222222222222222222222222222222222";

/// Checksummed wallet (EIP-55 test vector)
pub const DUMMY_CHECKSUM_ADDR: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

/// Send-leg transaction hash
pub const DUMMY_SEND_TX: &str =
    "0x00000000000000000000000000000000000000000000000000000000000000a1";

/// Receive-leg transaction hash
pub const DUMMY_RECEIVE_TX: &str =
    "0x00000000000000000000000000000000000000000000000000000000000000b1";

/// Second send-leg transaction hash
pub const DUMMY_SEND_TX_2: &str =
    "0x00000000000000000000000000000000000000000000000000000000000000a2";

/// Second receive-leg transaction hash
pub const DUMMY_RECEIVE_TX_2: &str =
    "0x00000000000000000000000000000000000000000000000000000000000000b2";

/// Base send timestamp (unix seconds)
pub const DUMMY_SEND_TIME: i64 = 1_000;

/// Receive timestamp within the default delta of DUMMY_SEND_TIME
pub const DUMMY_RECEIVE_TIME: i64 = 1_050;

// ============================================================================
// CONFIGURATION BUILDERS
// ============================================================================

/// Default production config with a dummy API key
pub fn build_test_config() -> Config {
    let mut config = Config::default();
    config.lookup.api_key = "test-api-key".to_string();
    config
}

/// Builds a validator over `lookup` with the test config
pub fn build_validator(lookup: Arc<MockTransferLookup>) -> ClaimValidator<MockTransferLookup> {
    ClaimValidator::new(&build_test_config(), lookup)
}

// ============================================================================
// TRANSFER LOOKUP DOUBLE
// ============================================================================

/// In-memory transfer lookup.
///
/// Records are keyed by (blockchain, lowercase tx hash); filters other than the hash
/// are recorded but not applied.
#[derive(Default)]
pub struct MockTransferLookup {
    records: HashMap<(String, String), Vec<TransferRecord>>,
    failing: HashSet<String>,
    queries: Mutex<Vec<TransferQuery>>,
}

impl MockTransferLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the records returned for `tx_hash` on `blockchain`
    pub fn with_records(mut self, blockchain: &str, tx_hash: &str, records: Vec<TransferRecord>) -> Self {
        self.records
            .insert((blockchain.to_string(), tx_hash.to_lowercase()), records);
        self
    }

    /// Makes every lookup of `tx_hash` fail with a transport-style error
    pub fn with_failure(mut self, tx_hash: &str) -> Self {
        self.failing.insert(tx_hash.to_lowercase());
        self
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<TransferQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl TransferLookup for MockTransferLookup {
    async fn lookup(&self, query: &TransferQuery) -> Result<Vec<TransferRecord>> {
        self.queries.lock().unwrap().push(query.clone());
        let hash = query.transaction_hash.to_lowercase();
        if self.failing.contains(&hash) {
            anyhow::bail!("connection refused");
        }
        Ok(self
            .records
            .get(&(query.blockchain.clone(), hash))
            .cloned()
            .unwrap_or_default())
    }
}

/// Lookup with the standard valid pair: send 1000 at t=1000, receive 950 at t=1050
pub fn valid_pair_lookup() -> MockTransferLookup {
    MockTransferLookup::new()
        .with_records("degen", DUMMY_SEND_TX, vec![send_record(1000.0, DUMMY_SEND_TIME, DUMMY_USER_ADDR)])
        .with_records(
            "base",
            DUMMY_RECEIVE_TX,
            vec![receive_record(950.0, DUMMY_RECEIVE_TIME, DUMMY_USER_ADDR)],
        )
}

// ============================================================================
// SINK DOUBLES
// ============================================================================

/// Collects verdicts in memory
#[derive(Default)]
pub struct VecSink {
    pub verdicts: Vec<Verdict>,
}

impl ResultSink for VecSink {
    fn append(&mut self, verdict: &Verdict) -> Result<()> {
        self.verdicts.push(verdict.clone());
        Ok(())
    }
}

/// Rejects every write
#[derive(Default)]
pub struct FailingSink {
    pub attempts: usize,
}

impl ResultSink for FailingSink {
    fn append(&mut self, _verdict: &Verdict) -> Result<()> {
        self.attempts += 1;
        anyhow::bail!("disk full")
    }
}

// ============================================================================
// DEFAULT RECORD CREATORS
// ============================================================================

/// UTC timestamp from unix seconds
pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Outbound transfer record executed by `operator`
pub fn send_record(amount: f64, secs: i64, operator: &str) -> TransferRecord {
    TransferRecord {
        block_timestamp: Some(ts(secs)),
        formatted_amount: Some(amount),
        to_addresses: vec!["0x43019f8be1f192587883b67dea2994999f5a2de2".to_string()],
        operator_addresses: vec![operator.to_string()],
    }
}

/// Inbound transfer record paid to `recipient`
pub fn receive_record(amount: f64, secs: i64, recipient: &str) -> TransferRecord {
    TransferRecord {
        block_timestamp: Some(ts(secs)),
        formatted_amount: Some(amount),
        to_addresses: vec![recipient.to_string()],
        operator_addresses: vec!["0x777e05d02ea7b42f32f103c089c175017082f531".to_string()],
    }
}

/// Claim matching `valid_pair_lookup()`
pub fn create_base_claim() -> Claim {
    Claim {
        claim_id: Some("1".to_string()),
        wallet_address: Some(DUMMY_USER_ADDR.to_string()),
        send_amount: Some(1000.0),
        send_tx_hash: Some(DUMMY_SEND_TX.to_string()),
        receive_amount: Some(950.0),
        receive_tx_hash: Some(DUMMY_RECEIVE_TX.to_string()),
        contact_info: Some("@alice".to_string()),
        additional_info: Some("bridged once".to_string()),
        ..Claim::default()
    }
}
