// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deposit notification endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::ApiError, state::AppState};

/// Notification that a deposit transaction was sent to the custodial account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DepositNotifyRequest {
    /// Signature (transaction hash) of the claimed deposit.
    #[serde(default)]
    pub signature: String,
    /// Caller's description of the transaction. Logged, never trusted.
    #[serde(default, alias = "claimedType")]
    pub claimed_type: Option<String>,
    /// Caller's claimed amount. Logged, never trusted: the credited amount is
    /// always re-derived from the chain record.
    #[serde(default, alias = "claimedAmount")]
    pub claimed_amount: Option<f64>,
}

/// Result of a verified deposit.
#[derive(Debug, Serialize, ToSchema)]
pub struct DepositNotifyResponse {
    /// Amount credited, as recorded on chain.
    pub verified_amount: f64,
    /// Vault balance after crediting.
    pub vault_balance: f64,
    /// Earned balance (unchanged by deposits).
    pub earned_balance: f64,
}

/// Verify a claimed deposit against the chain and credit the vault.
#[utoipa::path(
    post,
    path = "/tx-notify",
    tag = "Deposits",
    request_body = DepositNotifyRequest,
    responses(
        (status = 200, description = "Deposit verified and credited", body = DepositNotifyResponse),
        (status = 400, description = "Missing signature"),
        (status = 409, description = "Signature already credited"),
        (status = 422, description = "Transaction unconfirmed, errored, or not a credit to the custodial account"),
        (status = 503, description = "Chain unreachable")
    )
)]
pub async fn notify_deposit(
    State(state): State<AppState>,
    Json(request): Json<DepositNotifyRequest>,
) -> Result<Json<DepositNotifyResponse>, ApiError> {
    tracing::info!(
        signature = %request.signature,
        claimed_type = request.claimed_type.as_deref(),
        claimed_amount = request.claimed_amount,
        "deposit notification received"
    );

    let outcome = state.ledger.deposit_notify(&request.signature).await?;
    Ok(Json(DepositNotifyResponse {
        verified_amount: outcome.verified_amount,
        vault_balance: outcome.vault_balance,
        earned_balance: outcome.earned_balance,
    }))
}
