// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scripted in-memory ledger for workflow tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::ternary::{int_to_trits, trits_to_trytes};
use super::*;

/// Address the mock derives for `index`: 72 `A`s followed by the index.
pub fn address_for(index: u64) -> String {
    format!(
        "{}{}",
        "A".repeat(72),
        trits_to_trytes(&int_to_trits(index as i64, 27))
    )
}

#[derive(Default)]
pub struct MockState {
    pub balances: HashMap<String, u64>,
    /// Addresses whose balance lookup fails
    pub unreachable: Vec<String>,
    pub balance_queries: Vec<String>,
    pub derived: Vec<u64>,
    pub prepared: Vec<(Vec<Transfer>, PrepareOptions)>,
    pub submitted: Vec<Vec<String>>,
    /// Inclusion answers, one per poll; all false once exhausted
    pub inclusion_script: VecDeque<Vec<bool>>,
    pub inclusion_polls: usize,
    pub fail_prepare: bool,
    pub fail_send: bool,
    pub fail_inclusion: bool,
    pub fail_node_info: bool,
}

#[derive(Default)]
pub struct MockLedger {
    pub state: Mutex<MockState>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give the address at `index` a balance.
    pub fn fund(&self, index: u64, balance: u64) {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert(address_for(index), balance);
    }

    pub fn script_inclusion(&self, answers: Vec<Vec<bool>>) {
        self.state.lock().unwrap().inclusion_script = answers.into();
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn generate_address(&self, _seed: &Seed, index: u64) -> Result<String, LedgerError> {
        self.state.lock().unwrap().derived.push(index);
        Ok(address_for(index))
    }

    async fn get_balances(
        &self,
        addresses: &[String],
        _threshold: u8,
    ) -> Result<Vec<u64>, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.balance_queries.extend(addresses.iter().cloned());
        if addresses.iter().any(|a| state.unreachable.contains(a)) {
            return Err(LedgerError::RpcError("connection refused".to_string()));
        }
        Ok(addresses
            .iter()
            .map(|a| state.balances.get(a).copied().unwrap_or(0))
            .collect())
    }

    async fn prepare_transfers(
        &self,
        _seed: &Seed,
        transfers: &[Transfer],
        options: &PrepareOptions,
    ) -> Result<Vec<String>, LedgerError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_prepare {
            return Err(LedgerError::Internal("prepare failed".to_string()));
        }

        let spent: u64 = options.inputs.iter().map(|i| i.balance).sum();
        let wanted: u64 = transfers.iter().map(|t| t.value).sum();
        if wanted > spent {
            return Err(LedgerError::InsufficientBalance {
                required: wanted,
                available: spent,
            });
        }

        let count = transfers.len()
            + options.inputs.iter().map(|i| i.security).sum::<usize>()
            + usize::from(spent > wanted);
        state.prepared.push((transfers.to_vec(), options.clone()));
        Ok((0..count).rev().map(|i| format!("TRYTES{i}")).collect())
    }

    async fn send_trytes(
        &self,
        trytes: &[String],
        _depth: u8,
        _min_weight_magnitude: u8,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_send {
            return Err(LedgerError::NodeError("attachToTangle failed".to_string()));
        }
        state.submitted.push(trytes.to_vec());
        Ok(trytes
            .iter()
            .enumerate()
            .map(|(i, _)| Transaction {
                hash: format!("HASH{i}"),
                ..Transaction::default()
            })
            .collect())
    }

    async fn get_latest_inclusion(&self, hashes: &[String]) -> Result<Vec<bool>, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.inclusion_polls += 1;
        if state.fail_inclusion {
            return Err(LedgerError::NodeError("getInclusionStates failed".to_string()));
        }
        Ok(state
            .inclusion_script
            .pop_front()
            .unwrap_or_else(|| vec![false; hashes.len()]))
    }

    async fn node_info(&self) -> Result<NodeInfo, LedgerError> {
        if self.state.lock().unwrap().fail_node_info {
            return Err(LedgerError::RpcError("node unreachable".to_string()));
        }
        Ok(NodeInfo {
            app_name: "mock".to_string(),
            app_version: "0.0.0".to_string(),
            latest_solid_subtangle_milestone: "9".repeat(81),
            latest_solid_subtangle_milestone_index: 1,
        })
    }
}
