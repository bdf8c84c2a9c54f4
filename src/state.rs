// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::faucet::Faucet;
use crate::ledger::Ledger;
use crate::storage::WalletStore;

#[derive(Clone)]
pub struct AppState {
    pub faucet: Arc<Faucet>,
    /// Shared with the faucet; used by readiness checks
    pub store: Arc<WalletStore>,
    pub ledger: Arc<dyn Ledger>,
}

impl AppState {
    pub fn new(faucet: Arc<Faucet>, store: Arc<WalletStore>, ledger: Arc<dyn Ledger>) -> Self {
        Self {
            faucet,
            store,
            ledger,
        }
    }
}
