// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! IOTA node client over the JSON command API.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::signing::generate_address;
use super::transactions::prepare_transfers;
use super::types::*;
use super::Ledger;

/// API version header required by the node.
const API_VERSION_HEADER: &str = "X-IOTA-API-Version";

/// IOTA node client.
pub struct NodeClient {
    /// Network configuration
    network: NetworkConfig,
    /// Node endpoint
    url: url::Url,
    /// HTTP client with request timeout
    http: reqwest::Client,
}

impl NodeClient {
    /// Create a client for `provider_url` on the given network.
    pub fn new(
        network: NetworkConfig,
        provider_url: &str,
        timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let url: url::Url = provider_url
            .parse()
            .map_err(|e: url::ParseError| LedgerError::InvalidRpcUrl(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Internal(e.to_string()))?;

        Ok(Self { network, url, http })
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Send one API command and decode the response body.
    async fn command<T: DeserializeOwned>(&self, body: Value) -> Result<T, LedgerError> {
        let command = body
            .get("command")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        let response = self
            .http
            .post(self.url.clone())
            .header(API_VERSION_HEADER, "1")
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::RpcError(format!("{command}: {e}")))?;

        let status = response.status();
        let value: Value = response
            .json()
            .await
            .map_err(|e| LedgerError::InvalidResponse(format!("{command}: {e}")))?;

        if let Some(error) = value.get("error").or_else(|| value.get("exception")) {
            let message = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());
            return Err(LedgerError::NodeError(format!("{command}: {message}")));
        }
        if !status.is_success() {
            return Err(LedgerError::NodeError(format!("{command}: HTTP {status}")));
        }

        serde_json::from_value(value)
            .map_err(|e| LedgerError::InvalidResponse(format!("{command}: {e}")))
    }
}

#[derive(Deserialize)]
struct BalancesResponse {
    balances: Vec<String>,
}

#[derive(Deserialize)]
struct InclusionStatesResponse {
    states: Vec<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TipsResponse {
    trunk_transaction: String,
    branch_transaction: String,
}

#[derive(Deserialize)]
struct TrytesResponse {
    trytes: Vec<String>,
}

#[derive(Deserialize)]
struct EmptyResponse {}

#[async_trait]
impl Ledger for NodeClient {
    async fn generate_address(&self, seed: &Seed, index: u64) -> Result<String, LedgerError> {
        let seed = seed.clone();
        tokio::task::spawn_blocking(move || generate_address(&seed, index, SECURITY_LEVEL))
            .await
            .map_err(|e| LedgerError::Internal(e.to_string()))?
    }

    async fn get_balances(
        &self,
        addresses: &[String],
        threshold: u8,
    ) -> Result<Vec<u64>, LedgerError> {
        let response: BalancesResponse = self
            .command(json!({
                "command": "getBalances",
                "addresses": addresses,
                "threshold": threshold,
            }))
            .await?;

        response
            .balances
            .iter()
            .map(|raw| {
                raw.parse::<u64>()
                    .map_err(|e| LedgerError::InvalidResponse(format!("balance {raw:?}: {e}")))
            })
            .collect()
    }

    async fn prepare_transfers(
        &self,
        seed: &Seed,
        transfers: &[Transfer],
        options: &PrepareOptions,
    ) -> Result<Vec<String>, LedgerError> {
        let seed = seed.clone();
        let transfers = transfers.to_vec();
        let options = options.clone();
        tokio::task::spawn_blocking(move || prepare_transfers(&seed, &transfers, &options))
            .await
            .map_err(|e| LedgerError::Internal(e.to_string()))?
    }

    async fn send_trytes(
        &self,
        trytes: &[String],
        depth: u8,
        min_weight_magnitude: u8,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let tips: TipsResponse = self
            .command(json!({
                "command": "getTransactionsToApprove",
                "depth": depth,
            }))
            .await?;

        let attached: TrytesResponse = self
            .command(json!({
                "command": "attachToTangle",
                "trunkTransaction": tips.trunk_transaction,
                "branchTransaction": tips.branch_transaction,
                "minWeightMagnitude": min_weight_magnitude,
                "trytes": trytes,
            }))
            .await?;

        let _: EmptyResponse = self
            .command(json!({
                "command": "storeTransactions",
                "trytes": attached.trytes,
            }))
            .await?;

        let _: EmptyResponse = self
            .command(json!({
                "command": "broadcastTransactions",
                "trytes": attached.trytes,
            }))
            .await?;

        attached
            .trytes
            .iter()
            .map(|t| Transaction::from_trytes(t))
            .collect()
    }

    async fn get_latest_inclusion(&self, hashes: &[String]) -> Result<Vec<bool>, LedgerError> {
        let info = self.node_info().await?;
        let response: InclusionStatesResponse = self
            .command(json!({
                "command": "getInclusionStates",
                "transactions": hashes,
                "tips": [info.latest_solid_subtangle_milestone],
            }))
            .await?;
        Ok(response.states)
    }

    async fn node_info(&self) -> Result<NodeInfo, LedgerError> {
        self.command(json!({ "command": "getNodeInfo" })).await
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid trytes: {0}")]
    InvalidTrytes(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid address checksum: {0}")]
    InvalidChecksum(String),

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Node error: {0}")]
    NodeError(String),

    #[error("Invalid node response: {0}")]
    InvalidResponse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
