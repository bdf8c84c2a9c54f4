// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Cache Storage
//!
//! The faucet keeps one record, the custodial wallet, in a flat JSON cache
//! file under the user's home directory (or `FAUCET_CACHE_DIR`).
//!
//! ## Storage Layout
//!
//! ```text
//! <cache dir>/
//!   .wallet       # {"wallet": {"seed", "keyIndex", "defaultBalance", "address"}}
//! ```
//!
//! ## Important Notes
//!
//! - The seed is stored in plaintext; protect the directory accordingly
//! - Every save rewrites the file through a temp file and a rename

pub mod cache;
pub mod paths;
pub mod wallet;

pub use cache::{FlatCache, StorageError, StorageResult};
pub use paths::CachePaths;
pub use wallet::{WalletDefaults, WalletRecord, WalletStore};
