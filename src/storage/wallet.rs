// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository for the faucet's single custodial wallet record.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CachePaths, FlatCache, StorageError, StorageResult};
use crate::ledger::Seed;

/// Cache key of the wallet record.
pub const WALLET_KEY: &str = "wallet";

/// Persisted wallet state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub seed: Seed,
    /// Index of the address currently holding the funds
    pub key_index: u64,
    /// Amount dispensed when a request names none
    pub default_balance: u64,
    /// Last remainder address written by a transfer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Values used when the record is created.
#[derive(Debug, Clone)]
pub struct WalletDefaults {
    pub seed: Seed,
    pub default_balance: u64,
}

/// Wallet store backed by the flat cache.
pub struct WalletStore {
    cache: Mutex<FlatCache>,
    defaults: WalletDefaults,
}

impl WalletStore {
    /// Open the cache under `paths`.
    pub fn open(paths: CachePaths, defaults: WalletDefaults) -> StorageResult<Self> {
        Ok(Self {
            cache: Mutex::new(FlatCache::load(paths)?),
            defaults,
        })
    }

    /// Current record, created and persisted first if absent or seedless.
    pub fn load(&self) -> StorageResult<WalletRecord> {
        let mut cache = self.lock()?;
        Self::load_locked(&mut cache, &self.defaults)
    }

    /// Overwrite the remainder address and key index, persisting immediately.
    pub fn save(&self, address: &str, key_index: u64) -> StorageResult<WalletRecord> {
        let mut cache = self.lock()?;
        let mut record = Self::load_locked(&mut cache, &self.defaults)?;
        record.address = Some(address.to_string());
        record.key_index = key_index;

        cache.set_key(WALLET_KEY, &record)?;
        cache.save()?;
        Ok(record)
    }

    /// Verify the cache directory is writable.
    pub fn health_check(&self) -> StorageResult<()> {
        self.lock()?.health_check()
    }

    fn load_locked(cache: &mut FlatCache, defaults: &WalletDefaults) -> StorageResult<WalletRecord> {
        let has_seed = cache
            .get_raw(WALLET_KEY)
            .and_then(|record| record.get("seed"))
            .and_then(Value::as_str)
            .is_some_and(|seed| !seed.is_empty());

        if has_seed {
            if let Some(record) = cache.get_key::<WalletRecord>(WALLET_KEY)? {
                return Ok(record);
            }
        }

        let record = WalletRecord {
            seed: defaults.seed.clone(),
            key_index: 0,
            default_balance: defaults.default_balance,
            address: None,
        };
        cache.set_key(WALLET_KEY, &record)?;
        cache.save()?;
        tracing::info!(key_index = 0, "Initialized faucet wallet record");
        Ok(record)
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, FlatCache>> {
        self.cache
            .lock()
            .map_err(|_| StorageError::Corrupted("wallet cache lock poisoned".to_string()))
    }
}
