// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Confirmed-balance lookups.

use std::sync::Arc;

use crate::ledger::{Ledger, BALANCE_THRESHOLD};

/// Reads confirmed balances from the node.
///
/// Lookup failures are logged and reported as a zero balance, so callers
/// cannot tell an empty address from an unreachable node.
#[derive(Clone)]
pub struct BalanceOracle {
    ledger: Arc<dyn Ledger>,
}

impl BalanceOracle {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    pub async fn get_balance(&self, address: &str) -> u64 {
        if address.is_empty() {
            return 0;
        }

        match self
            .ledger
            .get_balances(&[address.to_string()], BALANCE_THRESHOLD)
            .await
        {
            Ok(balances) => balances.first().copied().unwrap_or(0),
            Err(e) => {
                tracing::warn!(address, error = %e, "Balance lookup failed, treating as empty");
                0
            }
        }
    }
}
