// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger types and protocol constants.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::client::LedgerError;
use super::ternary::is_trytes_of_length;

/// Minimum confirmation percentage passed to `getBalances`.
pub const BALANCE_THRESHOLD: u8 = 100;

/// Security level used for every faucet input.
pub const SECURITY_LEVEL: usize = 2;

/// Tip-selection depth for `getTransactionsToApprove`.
pub const DEPTH: u8 = 3;

/// Proof-of-work difficulty for `attachToTangle`.
pub const MIN_WEIGHT_MAGNITUDE: u8 = 10;

pub const SEED_LENGTH: usize = 81;
pub const ADDRESS_LENGTH: usize = 81;
pub const CHECKSUM_LENGTH: usize = 9;
pub const ADDRESS_WITH_CHECKSUM_LENGTH: usize = ADDRESS_LENGTH + CHECKSUM_LENGTH;
pub const HASH_TRYTES_LENGTH: usize = 81;
pub const TAG_LENGTH: usize = 27;
pub const SIGNATURE_FRAGMENT_LENGTH: usize = 2187;
pub const TRANSACTION_TRYTES_LENGTH: usize = 2673;

/// Ledger network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Node API endpoint URL
    pub provider_url: &'static str,
}

/// IOTA community network.
pub const COMNET: NetworkConfig = NetworkConfig {
    name: "IOTA Comnet",
    provider_url: "https://comnet.iota.works",
};

/// Wallet seed: 81 trytes of secret key material.
///
/// `Debug` is redacted so the seed never reaches a log line.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Seed(String);

impl Seed {
    pub fn new(value: impl Into<String>) -> Result<Self, LedgerError> {
        let value = value.into();
        if !is_trytes_of_length(&value, SEED_LENGTH) {
            return Err(LedgerError::InvalidSeed(format!(
                "expected {SEED_LENGTH} trytes, got {} characters",
                value.len()
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

impl TryFrom<String> for Seed {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Seed> for String {
    fn from(seed: Seed) -> Self {
        seed.0
    }
}

/// A value transfer to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Recipient address, 81 trytes or 90 with checksum
    pub address: String,
    pub value: u64,
}

/// An address spent in full as a bundle input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub address: String,
    pub key_index: u64,
    pub security: usize,
    pub balance: u64,
}

/// Inputs and remainder for a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareOptions {
    pub inputs: Vec<Input>,
    /// Receives `sum(inputs) - sum(transfers)` when positive
    pub remainder_address: Option<String>,
}

/// A parsed ledger transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub signature_message_fragment: String,
    pub address: String,
    pub value: i64,
    pub obsolete_tag: String,
    pub timestamp: i64,
    pub current_index: i64,
    pub last_index: i64,
    pub bundle: String,
    pub trunk_transaction: String,
    pub branch_transaction: String,
    pub tag: String,
    pub attachment_timestamp: i64,
    pub attachment_timestamp_lower_bound: i64,
    pub attachment_timestamp_upper_bound: i64,
    pub nonce: String,
}

/// Subset of `getNodeInfo` used by the faucet.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub app_version: String,
    pub latest_solid_subtangle_milestone: String,
    #[serde(default)]
    pub latest_solid_subtangle_milestone_index: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str =
        "NLRMWYYCDUVF9XQJYDFNNYTBSKPFKNHSDZWLLJOEDMDFRTDAZEPKYIHCTURJYYHHYQBMMYO9HOCBFDKSK";

    #[test]
    fn seed_requires_81_trytes() {
        assert!(Seed::new(SEED).is_ok());
        assert!(Seed::new("ABC").is_err());
        assert!(Seed::new(SEED.to_lowercase()).is_err());
    }

    #[test]
    fn seed_debug_is_redacted() {
        let seed = Seed::new(SEED).unwrap();
        let printed = format!("{seed:?}");
        assert!(!printed.contains("NLRM"));
    }

    #[test]
    fn seed_serializes_as_plain_string() {
        let seed = Seed::new(SEED).unwrap();
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, format!("\"{SEED}\""));
        let back: Seed = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seed);
        assert!(serde_json::from_str::<Seed>("\"short\"").is_err());
    }
}
