//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the claim reconciler.
//! Configuration includes the transfer indexer endpoint and credential, the filter
//! rules for each bridge leg, reconciliation tolerances, and input/output locations.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::validator::generic::validate_address_format;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "RECONCILER_CONFIG_PATH";

/// Environment variable that overrides `lookup.api_key`.
pub const API_KEY_ENV: &str = "AIRSTACK_API_KEY";

const DEFAULT_CONFIG_PATH: &str = "config/reconciler.toml";

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure containing all reconciler settings.
///
/// This structure holds configuration for:
/// - The transfer indexer (endpoint, credential, timeout)
/// - The outbound (send) leg filter rules
/// - The inbound (receive) leg filter rules
/// - Reconciliation tolerances
/// - Claim input and result output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Transfer indexer connection settings
    pub lookup: LookupConfig,
    /// Leg where the user sent funds into the bridge
    pub send_leg: LegConfig,
    /// Leg where the bridge paid funds out to the user
    pub receive_leg: LegConfig,
    /// Reconciliation tolerances
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
    /// Input and output locations
    #[serde(default)]
    pub io: IoConfig,
}

/// Connection settings for the indexed transfer data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// GraphQL endpoint URL
    pub api_url: String,
    /// API credential, sent in the Authorization header
    #[serde(default)]
    pub api_key: String,
    /// Per-request timeout in milliseconds (no timeout when unset)
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

/// Direction of a bridge leg relative to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegDirection {
    /// The user sent tokens into the bridge; the counterparty is the transfer operator
    Outbound,
    /// The bridge relayer paid tokens out; the counterparty is the transfer recipient
    Inbound,
}

/// Filter rules and labels for one bridge leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegConfig {
    /// Human-readable chain name used in notes (e.g. "Degen Chain")
    pub label: String,
    /// Blockchain identifier understood by the indexer (e.g. "degen")
    pub blockchain: String,
    /// Direction of the leg
    pub direction: LegDirection,
    /// Token symbol used in notes
    pub token_symbol: String,
    /// Token contract the transfer must be of
    #[serde(default)]
    pub token_address: Option<String>,
    /// Address the transfer must come from (bridge relayer for inbound legs)
    #[serde(default)]
    pub from_address: Option<String>,
    /// Address the transfer must go to (pool or router for outbound legs)
    #[serde(default)]
    pub to_address: Option<String>,
}

/// Tolerances applied while reconciling a claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Maximum seconds between the send and receive timestamps
    pub timestamp_delta_secs: u64,
    /// Allowed relative deviation of user-reported amounts (0.1 = 10%)
    pub amount_tolerance: f64,
    /// Prefix every transaction hash must carry
    pub hash_prefix: String,
}

/// Claim input and result output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Comma-separated claim file
    pub claims_path: String,
    /// Directory receiving the result files
    pub results_dir: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            timestamp_delta_secs: 120,
            amount_tolerance: 0.1,
            hash_prefix: "0x".to_string(),
        }
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            claims_path: "data/claims.csv".to_string(),
            results_dir: "results".to_string(),
        }
    }
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// Path priority: explicit `path` > `RECONCILER_CONFIG_PATH` > `config/reconciler.toml`.
    /// The API key is taken from `AIRSTACK_API_KEY` when that variable is set.
    ///
    /// # Returns
    ///
    /// - `Ok(Config)` - Successfully loaded configuration
    /// - `Err(anyhow::Error)` - Failed to load configuration or file doesn't exist
    pub fn load_from_path(path: Option<&str>) -> anyhow::Result<Self> {
        let config_path = path
            .map(|p| p.to_string())
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        if !Path::new(&config_path).exists() {
            return Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/reconciler.template.toml config/reconciler.toml\n\
                Then edit config/reconciler.toml with your actual values.",
                config_path
            ));
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read configuration file '{}'", config_path))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file '{}'", config_path))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from the default location (see [`Config::load_from_path`]).
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from_path(None)
    }

    /// Loads variables from a `.env` file into the process environment.
    ///
    /// Without `path`, `.env` is looked up in the current directory and its parents.
    /// A missing file is not an error, and variables already set are left unchanged.
    pub fn load_env_file(path: Option<&Path>) -> anyhow::Result<()> {
        let loaded = match path {
            Some(path) => dotenvy::from_path(path).map(|_| path.to_path_buf()),
            None => dotenvy::dotenv(),
        };

        match loaded {
            Ok(file) => {
                debug!("Loaded environment from {}", file.display());
                Ok(())
            }
            Err(e) if e.not_found() => Ok(()),
            Err(e) => Err(e).context("Failed to load .env file"),
        }
    }

    /// Replaces the API key with `AIRSTACK_API_KEY` when it is set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.lookup.api_key = key.trim().to_string();
            }
        }
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// Checks:
    /// - An API key is present and the endpoint is a valid URL
    /// - The amount tolerance is a non-negative number
    /// - The hash prefix is non-empty
    /// - The send leg is outbound and the receive leg is inbound
    /// - Every configured filter address is a well-formed EVM address
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.lookup.api_key.trim().is_empty() {
            anyhow::bail!(
                "Configuration error: no API key configured (set lookup.api_key or {})",
                API_KEY_ENV
            );
        }

        url::Url::parse(&self.lookup.api_url).map_err(|e| {
            anyhow::anyhow!(
                "Configuration error: invalid lookup.api_url '{}': {}",
                self.lookup.api_url,
                e
            )
        })?;

        let tolerance = self.reconciler.amount_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            anyhow::bail!(
                "Configuration error: reconciler.amount_tolerance must be a non-negative number, got {}",
                tolerance
            );
        }

        if self.reconciler.hash_prefix.is_empty() {
            anyhow::bail!("Configuration error: reconciler.hash_prefix must not be empty");
        }

        if self.send_leg.direction != LegDirection::Outbound {
            anyhow::bail!("Configuration error: send_leg must have direction = \"outbound\"");
        }
        if self.receive_leg.direction != LegDirection::Inbound {
            anyhow::bail!("Configuration error: receive_leg must have direction = \"inbound\"");
        }

        for (leg_name, leg) in [("send_leg", &self.send_leg), ("receive_leg", &self.receive_leg)] {
            let addresses = [
                ("token_address", &leg.token_address),
                ("from_address", &leg.from_address),
                ("to_address", &leg.to_address),
            ];
            for (field, address) in addresses {
                if let Some(address) = address {
                    validate_address_format(address).map_err(|e| {
                        anyhow::anyhow!("Configuration error: {}.{}: {}", leg_name, field, e)
                    })?;
                }
            }
        }

        Ok(())
    }
}

impl Default for Config {
    /// Production filter rules for the Degen Chain → Base DEGEN bridge.
    ///
    /// The API key is left empty; it must come from the config file or `AIRSTACK_API_KEY`.
    fn default() -> Self {
        Self {
            lookup: LookupConfig {
                api_url: "https://api.airstack.xyz/gql".to_string(),
                api_key: String::new(),
                request_timeout_ms: None,
            },
            send_leg: LegConfig {
                label: "Degen Chain".to_string(),
                blockchain: "degen".to_string(),
                direction: LegDirection::Outbound,
                token_symbol: "DEGEN".to_string(),
                token_address: None,
                from_address: None,
                // DEGEN/ETH ProxySwap pool
                to_address: Some("0x43019F8BE1F192587883b67dEA2994999f5a2de2".to_string()),
            },
            receive_leg: LegConfig {
                label: "Base".to_string(),
                blockchain: "base".to_string(),
                direction: LegDirection::Inbound,
                token_symbol: "DEGEN".to_string(),
                // DEGEN token on Base
                token_address: Some("0x4ed4E862860beD51a9570b96d89aF5E1B0Efefed".to_string()),
                // Bridge relayer
                from_address: Some("0x777e05D02Ea7B42F32f103c089C175017082f531".to_string()),
                to_address: None,
            },
            reconciler: ReconcilerConfig::default(),
            io: IoConfig::default(),
        }
    }
}
