// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger integration for the IOTA legacy network.
//!
//! This module provides functionality for:
//! - Deriving addresses from a seed (Kerl, W-OTS)
//! - Querying balances and inclusion states from a node
//! - Preparing signed bundles and submitting them with remote proof-of-work

pub mod client;
pub mod curl;
pub mod kerl;
pub mod signing;
pub mod ternary;
pub mod transactions;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

pub use client::{LedgerError, NodeClient};
pub use types::*;

/// Operations the faucet needs from a ledger node.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Derive the address for `index` (81 trytes, security level 2).
    async fn generate_address(&self, seed: &Seed, index: u64) -> Result<String, LedgerError>;

    /// Confirmed balances, in the order of `addresses`.
    async fn get_balances(
        &self,
        addresses: &[String],
        threshold: u8,
    ) -> Result<Vec<u64>, LedgerError>;

    /// Build and sign a bundle; returns its trytes, last index first.
    async fn prepare_transfers(
        &self,
        seed: &Seed,
        transfers: &[Transfer],
        options: &PrepareOptions,
    ) -> Result<Vec<String>, LedgerError>;

    /// Select tips, attach, store and broadcast.
    async fn send_trytes(
        &self,
        trytes: &[String],
        depth: u8,
        min_weight_magnitude: u8,
    ) -> Result<Vec<Transaction>, LedgerError>;

    /// Inclusion of each hash against the latest solid milestone.
    async fn get_latest_inclusion(&self, hashes: &[String]) -> Result<Vec<bool>, LedgerError>;

    async fn node_info(&self) -> Result<NodeInfo, LedgerError>;
}
