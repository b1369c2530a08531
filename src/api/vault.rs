// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Custodial account information endpoint.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::ApiError, state::AppState};

/// Custodial account information.
#[derive(Debug, Serialize, ToSchema)]
pub struct VaultInfoResponse {
    /// Public address of the custodial account.
    pub address: String,
    /// Live on-chain balance, in native units.
    pub on_chain_balance: f64,
}

/// Get the custodial account address and its on-chain balance.
#[utoipa::path(
    get,
    path = "/vault",
    tag = "Vault",
    responses(
        (status = 200, description = "Custodial account information", body = VaultInfoResponse),
        (status = 503, description = "Chain unreachable")
    )
)]
pub async fn vault_info(State(state): State<AppState>) -> Result<Json<VaultInfoResponse>, ApiError> {
    let info = state.ledger.vault_info().await?;
    Ok(Json(VaultInfoResponse {
        address: info.address,
        on_chain_balance: info.on_chain_balance,
    }))
}
