// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bundle submission and inclusion polling.
//!
//! A transfer spends the whole balance of the current address: the requested
//! amount goes to the recipient and the rest to the address at the next key
//! index. The new index is persisted as soon as the node accepts the bundle,
//! before inclusion is known.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::balance::BalanceOracle;
use super::FaucetError;
use crate::ledger::{
    Input, Ledger, PrepareOptions, Seed, Transaction, Transfer, DEPTH, MIN_WEIGHT_MAGNITUDE,
    SECURITY_LEVEL,
};
use crate::storage::WalletStore;

/// Upper bound on inclusion polls per transfer.
pub const MAX_INCLUSION_ATTEMPTS: usize = 20;

/// Polling stops early once exactly this many inclusion flags are set.
///
/// This matches a one-output, one-input (two fragments), one-remainder
/// bundle. Bundles of any other size never stop early.
pub const CONFIRMED_TX_TARGET: usize = 4;

/// Default delay between inclusion polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// One transfer from the faucet wallet.
#[derive(Debug, Clone)]
pub struct TransferRequest<'a> {
    pub receive_address: &'a str,
    pub source_address: &'a str,
    pub key_index: u64,
    pub seed: &'a Seed,
    pub amount: u64,
    /// Correlates log lines with the HTTP request
    pub request_id: Option<&'a str>,
}

/// Result of an inclusion poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InclusionReport {
    pub attempts: usize,
    pub confirmed: bool,
}

pub struct TransferExecutor {
    ledger: Arc<dyn Ledger>,
    oracle: BalanceOracle,
    store: Arc<WalletStore>,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

impl TransferExecutor {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        oracle: BalanceOracle,
        store: Arc<WalletStore>,
        poll_interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            ledger,
            oracle,
            store,
            poll_interval,
            shutdown,
        }
    }

    /// Prepare, sign and submit the transfer, then persist the next key index.
    ///
    /// Returns `Ok(None)` without submitting anything when the source address
    /// is empty.
    pub async fn submit(
        &self,
        request: &TransferRequest<'_>,
    ) -> Result<Option<Vec<Transaction>>, FaucetError> {
        let request_id = request.request_id.unwrap_or("-");
        let balance = self.oracle.get_balance(request.source_address).await;

        if balance == 0 {
            error!(
                request_id,
                address = request.source_address,
                key_index = request.key_index,
                "Insufficient faucet balance"
            );
            return Ok(None);
        }

        let remainder_index = request.key_index + 1;
        let remainder_address = self
            .ledger
            .generate_address(request.seed, remainder_index)
            .await?;

        let transfers = [Transfer {
            address: request.receive_address.to_string(),
            value: request.amount,
        }];
        let options = PrepareOptions {
            inputs: vec![Input {
                address: request.source_address.to_string(),
                key_index: request.key_index,
                security: SECURITY_LEVEL,
                balance,
            }],
            remainder_address: Some(remainder_address.clone()),
        };

        let trytes = self
            .ledger
            .prepare_transfers(request.seed, &transfers, &options)
            .await
            .inspect_err(|e| error!(request_id, error = %e, "prepareTransfers failed"))?;

        let transactions = self
            .ledger
            .send_trytes(&trytes, DEPTH, MIN_WEIGHT_MAGNITUDE)
            .await
            .inspect_err(|e| error!(request_id, error = %e, "sendTrytes failed"))?;

        self.store
            .save(&remainder_address, remainder_index)
            .inspect_err(|e| {
                error!(
                    request_id,
                    error = %e,
                    key_index = remainder_index,
                    remainder = %remainder_address,
                    broadcast = transactions.len(),
                    "Bundle broadcast but next key index not persisted"
                )
            })?;

        info!(
            request_id,
            amount = request.amount,
            balance,
            key_index = remainder_index,
            remainder = %remainder_address,
            transactions = transactions.len(),
            "Submitted faucet transfer"
        );

        Ok(Some(transactions))
    }

    /// Poll inclusion until exactly [`CONFIRMED_TX_TARGET`] flags are set,
    /// [`MAX_INCLUSION_ATTEMPTS`] polls were made, or shutdown begins.
    ///
    /// Poll errors are logged and count as an attempt.
    pub async fn await_inclusion(
        &self,
        transactions: &[Transaction],
        request_id: Option<&str>,
    ) -> InclusionReport {
        let request_id = request_id.unwrap_or("-");
        let hashes: Vec<String> = transactions.iter().map(|tx| tx.hash.clone()).collect();
        let mut attempts = 0;

        while attempts < MAX_INCLUSION_ATTEMPTS {
            attempts += 1;

            match self.ledger.get_latest_inclusion(&hashes).await {
                Ok(states) => {
                    let included = states.iter().filter(|&&state| state).count();
                    if included == CONFIRMED_TX_TARGET {
                        info!(request_id, attempts, "Faucet transfer confirmed");
                        return InclusionReport {
                            attempts,
                            confirmed: true,
                        };
                    }
                }
                Err(e) => warn!(request_id, attempts, error = %e, "Inclusion poll failed"),
            }

            if attempts == MAX_INCLUSION_ATTEMPTS {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = self.shutdown.cancelled() => {
                    info!(request_id, attempts, "Inclusion polling stopped by shutdown");
                    break;
                }
            }
        }

        warn!(request_id, attempts, "Faucet transfer not confirmed");
        InclusionReport {
            attempts,
            confirmed: false,
        }
    }
}
