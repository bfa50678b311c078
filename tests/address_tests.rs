//! Unit tests for address and hash format helpers

use bridge_claim_reconciler::validator::{
    addresses_match, is_valid_address, normalize_tx_hash, to_checksum_address,
    validate_address_format,
};

#[path = "helpers.rs"]
mod helpers;
use helpers::{DUMMY_CHECKSUM_ADDR, DUMMY_USER_ADDR};

// ============================================================================
// WALLET ADDRESS SYNTAX
// ============================================================================

/// What is tested: lowercase and uppercase hex addresses are accepted
/// Why: Single-case addresses carry no checksum
#[test]
fn test_single_case_addresses_valid() {
    assert!(is_valid_address(DUMMY_USER_ADDR));
    assert!(is_valid_address("0xde709f2102306220921060314715629080e2fb77"));
    assert!(is_valid_address("0x52908400098527886E0F7030069857D2E4169EE7"));
}

/// What is tested: the 0x prefix is optional
/// Why: Users frequently paste addresses without it
#[test]
fn test_address_without_prefix_valid() {
    assert!(is_valid_address("de709f2102306220921060314715629080e2fb77"));
}

/// What is tested: EIP-55 checksummed addresses are accepted
/// Why: Wallets display checksummed addresses
#[test]
fn test_checksum_addresses_valid() {
    for address in [
        DUMMY_CHECKSUM_ADDR,
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ] {
        assert!(is_valid_address(address), "{} should be valid", address);
    }
}

/// What is tested: mixed-case addresses with a wrong checksum are rejected
/// Why: A broken checksum indicates a typo
#[test]
fn test_bad_checksum_rejected() {
    assert!(!is_valid_address("0x5aaeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
}

/// What is tested: wrong length, non-hex and empty inputs are rejected
/// Why: Only 20-byte hex strings are addresses
#[test]
fn test_malformed_addresses_rejected() {
    assert!(!is_valid_address(""));
    assert!(!is_valid_address("0x"));
    assert!(!is_valid_address("0x111111111111111111111111111111111111111"));
    assert!(!is_valid_address("0x11111111111111111111111111111111111111111"));
    assert!(!is_valid_address("0xgggggggggggggggggggggggggggggggggggggggg"));
    assert!(!is_valid_address("alice.eth"));
}

/// What is tested: an uppercase 0X prefix is rejected
/// Why: Only the lowercase 0x prefix is a valid address prefix
#[test]
fn test_uppercase_prefix_rejected() {
    assert!(!is_valid_address("0X1111111111111111111111111111111111111111"));
    assert!(!is_valid_address("0X5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
}

/// What is tested: to_checksum_address produces the EIP-55 form
/// Why: Checksum validation depends on it
#[test]
fn test_to_checksum_address() {
    assert_eq!(
        to_checksum_address(&DUMMY_CHECKSUM_ADDR.to_lowercase()),
        DUMMY_CHECKSUM_ADDR
    );
}

// ============================================================================
// CONFIGURED ADDRESS FORMAT
// ============================================================================

/// What is tested: validate_address_format requires 0x and 40 hex chars
/// Why: Configured filter addresses are sent verbatim to the indexer
#[test]
fn test_validate_address_format() {
    assert!(validate_address_format(DUMMY_USER_ADDR).is_ok());
    assert!(validate_address_format(DUMMY_CHECKSUM_ADDR).is_ok());
    assert!(validate_address_format("1111111111111111111111111111111111111111").is_err());
    assert!(validate_address_format("0x1234").is_err());
    assert!(validate_address_format("0xzz11111111111111111111111111111111111111").is_err());
}

// ============================================================================
// COMPARISON AND NORMALIZATION
// ============================================================================

/// What is tested: address comparison ignores case
/// Why: Indexers return lowercase addresses while users submit checksummed ones
#[test]
fn test_addresses_match_ignores_case() {
    assert!(addresses_match(DUMMY_CHECKSUM_ADDR, &DUMMY_CHECKSUM_ADDR.to_lowercase()));
    assert!(!addresses_match(DUMMY_CHECKSUM_ADDR, DUMMY_USER_ADDR));
}

/// What is tested: hash normalization lowercases and drops blanks
/// Why: Duplicate tracking keys on the normalized form
#[test]
fn test_normalize_tx_hash() {
    assert_eq!(normalize_tx_hash(Some(" 0xABC ")), Some("0xabc".to_string()));
    assert_eq!(normalize_tx_hash(Some("")), None);
    assert_eq!(normalize_tx_hash(None), None);
}
