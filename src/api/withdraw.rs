// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Withdrawal endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::ApiError, state::AppState};

/// Request to withdraw earned balance.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WithdrawRequest {
    /// Destination address (0x + 40 hex chars).
    #[serde(alias = "address", alias = "to")]
    pub destination: String,
    /// Amount to withdraw, in native units.
    pub amount: f64,
}

/// Result of a confirmed withdrawal.
#[derive(Debug, Serialize, ToSchema)]
pub struct WithdrawResponse {
    /// Hash of the confirmed transfer.
    pub tx_hash: String,
    /// Earned balance after the withdrawal.
    pub earned_balance: f64,
}

/// Withdraw earned balance to a destination address.
///
/// The earned deduction is persisted before the transfer is submitted and
/// restored if the transfer fails, so the response always reflects a settled
/// state.
#[utoipa::path(
    post,
    path = "/withdraw",
    tag = "Withdrawals",
    request_body = WithdrawRequest,
    responses(
        (status = 200, description = "Transfer confirmed", body = WithdrawResponse),
        (status = 400, description = "Invalid address or non-positive amount"),
        (status = 409, description = "Insufficient earned or on-chain balance"),
        (status = 502, description = "Transfer failed; earned balance restored"),
        (status = 503, description = "Chain unreachable")
    )
)]
pub async fn withdraw(
    State(state): State<AppState>,
    Json(request): Json<WithdrawRequest>,
) -> Result<Json<WithdrawResponse>, ApiError> {
    let outcome = state
        .ledger
        .withdraw(&request.destination, request.amount)
        .await?;

    tracing::info!(
        tx_hash = %outcome.tx_hash,
        amount = request.amount,
        destination = %request.destination,
        "withdrawal confirmed"
    );
    Ok(Json(WithdrawResponse {
        tx_hash: outcome.tx_hash,
        earned_balance: outcome.earned_balance,
    }))
}
