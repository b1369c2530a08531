// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reconciliation status endpoint.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::ApiError, state::AppState};

/// Tracked balances reconciled against the chain.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Value deposited but not yet earned, in native units.
    pub vault_balance: f64,
    /// Value unlocked and eligible for withdrawal, in native units.
    pub earned_balance: f64,
    /// Sum of both tracked balances.
    pub total_tracked: f64,
    /// Live on-chain balance of the custodial account.
    pub on_chain_balance: f64,
    /// Signed difference `on_chain_balance - total_tracked`. Divergence is
    /// reported here, never silently corrected.
    pub discrepancy: f64,
    /// Completed-cycle counter.
    pub completed_cycles: u64,
    /// When this report was produced.
    pub timestamp: String,
}

/// Report both tracked balances, the on-chain balance, and their discrepancy.
///
/// Read-only and unsequenced: answers from the last persisted snapshot plus a
/// live chain query, and never waits on in-flight mutations.
#[utoipa::path(
    get,
    path = "/status",
    tag = "Status",
    responses(
        (status = 200, description = "Reconciliation report", body = StatusResponse),
        (status = 503, description = "Chain unreachable")
    )
)]
pub async fn ledger_status(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    let report = state.ledger.status().await?;
    Ok(Json(StatusResponse {
        vault_balance: report.vault_balance,
        earned_balance: report.earned_balance,
        total_tracked: report.total_tracked,
        on_chain_balance: report.on_chain_balance,
        discrepancy: report.discrepancy,
        completed_cycles: report.completed_cycles,
        timestamp: Utc::now().to_rfc3339(),
    }))
}
