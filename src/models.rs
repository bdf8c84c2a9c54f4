// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response types for the faucet endpoint. Responses derive
//! `ToSchema` for the OpenAPI document.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query string of the dispense endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct FaucetQuery {
    /// Recipient address (81 trytes, or 90 with checksum)
    pub address: Option<String>,
    /// Amount to send; defaults to the wallet's default amount
    pub amount: Option<String>,
}

impl FaucetQuery {
    /// Recipient address, if present and non-empty.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }

    /// Requested amount. An empty value counts as absent.
    pub fn amount(&self) -> Result<Option<u64>, String> {
        match self.amount.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<u64>()
                .map(Some)
                .map_err(|_| format!("`{raw}` is not a whole number of tokens")),
        }
    }
}

/// Dispense result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FaucetResponse {
    /// Whether any transaction was submitted
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FaucetResponse {
    pub fn submitted(success: bool) -> Self {
        Self {
            success,
            error: None,
        }
    }

    pub fn no_address() -> Self {
        Self {
            success: false,
            error: Some("no address".to_string()),
        }
    }
}
