// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Faucet Workflow
//!
//! One dispense request runs:
//!
//! ```text
//! load wallet -> derive address -> balance -> [repair if zero]
//!             -> prepare + submit -> persist index + 1 -> poll inclusion
//! ```
//!
//! Everything up to and including the persist step runs under a single async
//! lock, so concurrent requests never spend from or write the same key index.
//! Inclusion polling happens after the lock is released.

pub mod balance;
pub mod repair;
pub mod transfer;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub use balance::BalanceOracle;
pub use repair::{RepairOutcome, WalletRepairer, REPAIR_OFFSETS};
pub use transfer::{
    InclusionReport, TransferExecutor, TransferRequest, CONFIRMED_TX_TARGET,
    DEFAULT_POLL_INTERVAL, MAX_INCLUSION_ATTEMPTS,
};

use crate::ledger::signing::normalize_address;
use crate::ledger::{Ledger, LedgerError, Transaction};
use crate::storage::{StorageError, WalletStore};

/// Errors that abort a dispense request.
#[derive(Debug, thiserror::Error)]
pub enum FaucetError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

pub struct Faucet {
    ledger: Arc<dyn Ledger>,
    store: Arc<WalletStore>,
    oracle: BalanceOracle,
    repairer: WalletRepairer,
    executor: TransferExecutor,
    dispense_lock: Mutex<()>,
}

impl Faucet {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        store: Arc<WalletStore>,
        poll_interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        let oracle = BalanceOracle::new(ledger.clone());
        Self {
            repairer: WalletRepairer::new(ledger.clone(), oracle.clone()),
            executor: TransferExecutor::new(
                ledger.clone(),
                oracle.clone(),
                store.clone(),
                poll_interval,
                shutdown,
            ),
            ledger,
            store,
            oracle,
            dispense_lock: Mutex::new(()),
        }
    }

    /// Send `amount` (or the wallet's default amount) to `receive_address`.
    ///
    /// Returns the submitted transactions, or an empty list when the wallet
    /// had nothing to spend.
    pub async fn dispense(
        &self,
        receive_address: &str,
        amount: Option<u64>,
        request_id: Option<&str>,
    ) -> Result<Vec<Transaction>, FaucetError> {
        normalize_address(receive_address)?;
        if amount == Some(0) {
            return Err(FaucetError::InvalidAmount(
                "amount must be greater than zero".to_string(),
            ));
        }

        let transactions = {
            let _guard = self.dispense_lock.lock().await;

            let wallet = self.store.load()?;
            let mut key_index = wallet.key_index;
            let mut address = self.ledger.generate_address(&wallet.seed, key_index).await?;

            if self.oracle.get_balance(&address).await == 0 {
                match self.repairer.repair(&wallet.seed, key_index).await {
                    Ok(RepairOutcome::Repaired {
                        address: repaired,
                        key_index: repaired_index,
                    }) => {
                        address = repaired;
                        key_index = repaired_index;
                    }
                    Ok(RepairOutcome::NotFound) => {
                        warn!(key_index, "No funded key index found near the stored one");
                    }
                    Err(e) => warn!(key_index, error = %e, "Wallet repair failed"),
                }
            }

            let request = TransferRequest {
                receive_address,
                source_address: &address,
                key_index,
                seed: &wallet.seed,
                amount: amount.unwrap_or(wallet.default_balance),
                request_id,
            };
            self.executor.submit(&request).await?
        };

        let Some(transactions) = transactions else {
            return Ok(Vec::new());
        };

        let report = self.executor.await_inclusion(&transactions, request_id).await;
        info!(
            request_id = request_id.unwrap_or("-"),
            confirmed = report.confirmed,
            attempts = report.attempts,
            "Dispense finished"
        );

        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::mock::{address_for, MockLedger};
    use crate::ledger::Seed;
    use crate::storage::{CachePaths, WalletDefaults};

    const SEED: &str =
        "NLRMWYYCDUVF9XQJYDFNNYTBSKPFKNHSDZWLLJOEDMDFRTDAZEPKYIHCTURJYYHHYQBMMYO9HOCBFDKSK";
    const RECIPIENT: &str =
        "RECIPIENT99999999999999999999999999999999999999999999999999999999999999999999999A";

    struct Fixture {
        ledger: Arc<MockLedger>,
        store: Arc<WalletStore>,
        faucet: Arc<Faucet>,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            WalletStore::open(
                CachePaths::new(dir.path()),
                WalletDefaults {
                    seed: Seed::new(SEED).unwrap(),
                    default_balance: 20_000,
                },
            )
            .unwrap(),
        );
        let ledger = Arc::new(MockLedger::new());
        let faucet = Arc::new(Faucet::new(
            ledger.clone(),
            store.clone(),
            Duration::ZERO,
            CancellationToken::new(),
        ));
        Fixture {
            ledger,
            store,
            faucet,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn dispenses_default_amount_from_stored_index() {
        let fx = fixture();
        fx.ledger.fund(0, 100_000);

        let txs = fx.faucet.dispense(RECIPIENT, None, Some("req")).await.unwrap();

        assert_eq!(txs.len(), 4);
        let (transfers, options) = fx.ledger.with(|s| s.prepared[0].clone());
        assert_eq!(transfers[0].value, 20_000);
        assert_eq!(options.inputs[0].address, address_for(0));

        let record = fx.store.load().unwrap();
        assert_eq!(record.key_index, 1);
        assert_eq!(record.address, Some(address_for(1)));
    }

    #[tokio::test]
    async fn explicit_amount_overrides_default() {
        let fx = fixture();
        fx.ledger.fund(0, 100_000);

        fx.faucet.dispense(RECIPIENT, Some(750), None).await.unwrap();

        let (transfers, _) = fx.ledger.with(|s| s.prepared[0].clone());
        assert_eq!(transfers[0].value, 750);
    }

    #[tokio::test]
    async fn repaired_index_is_used_for_the_transfer() {
        let fx = fixture();
        fx.store.save(&address_for(5), 5).unwrap();
        fx.ledger.fund(6, 40_000);

        let txs = fx.faucet.dispense(RECIPIENT, None, None).await.unwrap();

        assert!(!txs.is_empty());
        let (_, options) = fx.ledger.with(|s| s.prepared[0].clone());
        assert_eq!(options.inputs[0].key_index, 6);
        assert_eq!(options.inputs[0].address, address_for(6));
        assert_eq!(options.remainder_address, Some(address_for(7)));
        assert_eq!(fx.store.load().unwrap().key_index, 7);
    }

    #[tokio::test]
    async fn empty_wallet_without_repair_submits_nothing() {
        let fx = fixture();

        let txs = fx.faucet.dispense(RECIPIENT, None, None).await.unwrap();

        assert!(txs.is_empty());
        assert!(fx.ledger.with(|s| s.submitted.is_empty()));
        assert_eq!(fx.store.load().unwrap().key_index, 0);
    }

    #[tokio::test]
    async fn successive_dispenses_advance_one_index_each() {
        let fx = fixture();
        fx.ledger.fund(0, 100_000);
        fx.ledger.fund(1, 80_000);

        fx.faucet.dispense(RECIPIENT, None, None).await.unwrap();
        fx.faucet.dispense(RECIPIENT, None, None).await.unwrap();

        assert_eq!(fx.store.load().unwrap().key_index, 2);
        let inputs: Vec<u64> = fx.ledger.with(|s| {
            s.prepared
                .iter()
                .map(|(_, options)| options.inputs[0].key_index)
                .collect()
        });
        assert_eq!(inputs, vec![0, 1]);
    }

    #[tokio::test]
    async fn concurrent_dispenses_do_not_share_an_index() {
        let fx = fixture();
        fx.ledger.fund(0, 100_000);
        fx.ledger.fund(1, 80_000);

        let first = tokio::spawn({
            let faucet = fx.faucet.clone();
            async move { faucet.dispense(RECIPIENT, None, None).await }
        });
        let second = tokio::spawn({
            let faucet = fx.faucet.clone();
            async move { faucet.dispense(RECIPIENT, None, None).await }
        });
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let mut inputs: Vec<u64> = fx.ledger.with(|s| {
            s.prepared
                .iter()
                .map(|(_, options)| options.inputs[0].key_index)
                .collect()
        });
        inputs.sort_unstable();
        assert_eq!(inputs, vec![0, 1]);
        assert_eq!(fx.store.load().unwrap().key_index, 2);
    }

    #[tokio::test]
    async fn invalid_recipient_is_rejected_before_any_lookup() {
        let fx = fixture();

        let err = fx.faucet.dispense("bogus", None, None).await.unwrap_err();

        assert!(matches!(err, FaucetError::Ledger(LedgerError::InvalidAddress(_))));
        assert!(fx.ledger.with(|s| s.balance_queries.is_empty()));
    }

    #[tokio::test]
    async fn zero_amount_is_rejected() {
        let fx = fixture();
        let err = fx.faucet.dispense(RECIPIENT, Some(0), None).await.unwrap_err();
        assert!(matches!(err, FaucetError::InvalidAmount(_)));
    }

    #[tokio::test]
    async fn amount_above_balance_is_an_error() {
        let fx = fixture();
        fx.ledger.fund(0, 100);

        let err = fx.faucet.dispense(RECIPIENT, Some(101), None).await.unwrap_err();

        assert!(matches!(
            err,
            FaucetError::Ledger(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(fx.store.load().unwrap().key_index, 0);
    }
}
