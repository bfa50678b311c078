//! Airstack GraphQL Client
//!
//! This module provides a client for the Airstack indexer's GraphQL API. It answers
//! `TokenTransfers` queries scoped to one blockchain and one transaction hash.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{TransferLookup, TransferQuery, TransferRecord};
use crate::config::LookupConfig;

const TOKEN_TRANSFERS_QUERY: &str = r#"
query LegTransfers($blockchain: TokenBlockchain!, $filter: TokenTransferFilter!) {
  TokenTransfers(input: {blockchain: $blockchain, filter: $filter}) {
    TokenTransfer {
      blockTimestamp
      formattedAmount
      to {
        addresses
      }
      operator {
        addresses
      }
    }
  }
}
"#;

/// Failures reported by the indexer itself.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("indexer returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("indexer returned GraphQL errors: {0}")]
    GraphQl(String),
}

// ============================================================================
// API RESPONSE STRUCTURES
// ============================================================================

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<TokenTransfersData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct TokenTransfersData {
    #[serde(rename = "TokenTransfers")]
    token_transfers: Option<TokenTransfersOutput>,
}

#[derive(Debug, Deserialize)]
struct TokenTransfersOutput {
    #[serde(rename = "TokenTransfer")]
    token_transfer: Option<Vec<RawTokenTransfer>>,
}

#[derive(Debug, Deserialize)]
struct RawTokenTransfer {
    #[serde(rename = "blockTimestamp")]
    block_timestamp: Option<String>,
    #[serde(rename = "formattedAmount")]
    formatted_amount: Option<serde_json::Value>,
    to: Option<RawIdentity>,
    operator: Option<RawIdentity>,
}

#[derive(Debug, Deserialize)]
struct RawIdentity {
    addresses: Option<Vec<String>>,
}

impl RawTokenTransfer {
    fn into_record(self) -> TransferRecord {
        let block_timestamp = self.block_timestamp.as_deref().and_then(|ts| {
            DateTime::parse_from_rfc3339(ts)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| debug!("Ignoring unparsable blockTimestamp '{}': {}", ts, e))
                .ok()
        });

        let formatted_amount = match self.formatted_amount {
            Some(serde_json::Value::Number(n)) => n.as_f64(),
            Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        TransferRecord {
            block_timestamp,
            formatted_amount,
            to_addresses: self.to.and_then(|i| i.addresses).unwrap_or_default(),
            operator_addresses: self.operator.and_then(|i| i.addresses).unwrap_or_default(),
        }
    }
}

// ============================================================================
// AIRSTACK CLIENT IMPLEMENTATION
// ============================================================================

/// Client for the Airstack GraphQL API
#[derive(Debug, Clone)]
pub struct AirstackClient {
    /// HTTP client for making requests
    client: Client,
    /// GraphQL endpoint URL
    api_url: String,
    /// API key sent in the Authorization header
    api_key: String,
}

impl AirstackClient {
    /// Creates a new client for the given endpoint.
    ///
    /// # Arguments
    ///
    /// * `api_url` - GraphQL endpoint URL
    /// * `api_key` - API credential
    /// * `timeout` - Optional per-request timeout
    pub fn new(api_url: &str, api_key: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Creates a client from the lookup section of the configuration.
    pub fn from_config(config: &LookupConfig) -> Result<Self> {
        Self::new(
            &config.api_url,
            &config.api_key,
            config.request_timeout_ms.map(Duration::from_millis),
        )
    }

    /// Returns the endpoint URL of this client
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Builds the GraphQL variables for a query. Only the filters that are set are sent.
    fn build_variables(query: &TransferQuery) -> serde_json::Value {
        let mut filter = serde_json::Map::new();
        if let Some(token) = &query.token_address {
            filter.insert("tokenAddress".into(), serde_json::json!({ "_eq": token }));
        }
        if let Some(from) = &query.from {
            filter.insert("from".into(), serde_json::json!({ "_eq": from }));
        }
        if let Some(to) = &query.to {
            filter.insert("to".into(), serde_json::json!({ "_eq": to }));
        }
        filter.insert(
            "transactionHash".into(),
            serde_json::json!({ "_eq": query.transaction_hash }),
        );

        serde_json::json!({
            "blockchain": query.blockchain,
            "filter": filter,
        })
    }

    /// Queries token transfers matching `query`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<TransferRecord>)` - Matching transfers (empty when none exist)
    /// * `Err(anyhow::Error)` - Transport failure, HTTP error or GraphQL error
    pub async fn get_token_transfers(&self, query: &TransferQuery) -> Result<Vec<TransferRecord>> {
        let request = GraphQlRequest {
            query: TOKEN_TRANSFERS_QUERY,
            variables: Self::build_variables(query),
        };

        debug!(
            "Querying {} transfers for tx {} at {}",
            query.blockchain, query.transaction_hash, self.api_url
        );

        let response = self
            .client
            .post(&self.api_url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to send TokenTransfers request to {}", self.api_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Http {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let response: GraphQlResponse = response.json().await.with_context(|| {
            format!("Failed to parse TokenTransfers response from {}", self.api_url)
        })?;

        if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(LookupError::GraphQl(messages.join("; ")).into());
        }

        let records = response
            .data
            .and_then(|d| d.token_transfers)
            .and_then(|t| t.token_transfer)
            .unwrap_or_default()
            .into_iter()
            .map(RawTokenTransfer::into_record)
            .collect();

        Ok(records)
    }
}

impl TransferLookup for AirstackClient {
    async fn lookup(&self, query: &TransferQuery) -> Result<Vec<TransferRecord>> {
        self.get_token_transfers(query).await
    }
}
