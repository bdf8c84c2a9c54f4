// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    Json,
};
use tracing::info;

use crate::{
    error::ApiError,
    faucet::FaucetError,
    models::{FaucetQuery, FaucetResponse},
    state::AppState,
};

/// Header set by the request-id layer.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Dispense tokens to `address`.
///
/// A missing address is not an error; any failure while dispensing is
/// reported as 403 with the error text.
#[utoipa::path(
    get,
    path = "/",
    params(FaucetQuery),
    tag = "Faucet",
    responses(
        (status = 200, description = "Dispense attempted", body = FaucetResponse),
        (status = 403, description = "Dispense failed")
    )
)]
pub async fn dispense(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<FaucetQuery>, QueryRejection>,
) -> Result<Json<FaucetResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::forbidden(rejection.body_text()))?;
    let Some(address) = query.address() else {
        return Ok(Json(FaucetResponse::no_address()));
    };

    let amount = query.amount().map_err(FaucetError::InvalidAmount)?;
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok());
    let log_id = request_id.unwrap_or("-");

    let transactions = state
        .faucet
        .dispense(address, amount, request_id)
        .await
        .inspect_err(|e| tracing::error!(request_id = log_id, error = %e, "Dispense failed"))?;

    info!(request_id = log_id, transactions = transactions.len(), "Dispense request handled");
    Ok(Json(FaucetResponse::submitted(!transactions.is_empty())))
}
