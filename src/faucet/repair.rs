// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Recovery of the funded key index after the stored one drifted.

use std::sync::Arc;

use tracing::info;

use super::balance::BalanceOracle;
use crate::ledger::{Ledger, LedgerError, Seed};

/// Offsets from the stored key index, most likely first.
pub const REPAIR_OFFSETS: [i64; 14] = [-2, -1, 1, 2, 3, 4, -3, -4, -5, -6, -7, 5, 6, 7];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    /// A neighbouring index holds funds.
    Repaired { address: String, key_index: u64 },
    NotFound,
}

pub struct WalletRepairer {
    ledger: Arc<dyn Ledger>,
    oracle: BalanceOracle,
}

impl WalletRepairer {
    pub fn new(ledger: Arc<dyn Ledger>, oracle: BalanceOracle) -> Self {
        Self { ledger, oracle }
    }

    /// Probe [`REPAIR_OFFSETS`] around `key_index` one at a time and return
    /// the first address with a positive balance.
    pub async fn repair(&self, seed: &Seed, key_index: u64) -> Result<RepairOutcome, LedgerError> {
        for offset in REPAIR_OFFSETS {
            let Some(candidate) = key_index.checked_add_signed(offset) else {
                continue;
            };

            let address = self.ledger.generate_address(seed, candidate).await?;
            let balance = self.oracle.get_balance(&address).await;
            if balance > 0 {
                info!(
                    old_key_index = key_index,
                    key_index = candidate,
                    balance,
                    address = %address,
                    "Repaired faucet wallet"
                );
                return Ok(RepairOutcome::Repaired {
                    address,
                    key_index: candidate,
                });
            }
        }

        Ok(RepairOutcome::NotFound)
    }
}
