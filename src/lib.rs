// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tangle Faucet - Custodial IOTA Testnet Faucet Service
//!
//! This crate dispenses testnet tokens from a single seed-derived wallet to
//! caller-supplied addresses, repairing the tracked key index when it drifts.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `faucet` - Dispense workflow (balance, repair, transfer)
//! - `ledger` - IOTA ternary crypto and node client
//! - `storage` - Wallet record cache

pub mod api;
pub mod config;
pub mod error;
pub mod faucet;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
