// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Recovery endpoints: one-time migration and direct state override.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    ledger::StateOverride,
    state::AppState,
    storage::LedgerState,
};

/// Result of the one-time ledger migration.
#[derive(Debug, Serialize, ToSchema)]
pub struct MigrateResponse {
    /// On-chain balance adopted into the vault.
    pub migrated_amount: f64,
    pub vault_balance: f64,
}

/// Request to directly set ledger fields.
///
/// Values are coerced leniently: a field of the wrong type is ignored, not
/// rejected, and numeric values are clamped to their valid range.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SetStateRequest {
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub vault_balance: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub earned_balance: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub reward_per_cycle: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<u64>)]
    pub completed_cycles: Option<Value>,
}

/// Before/after snapshot of an applied override.
#[derive(Debug, Serialize, ToSchema)]
pub struct SetStateResponse {
    pub before: LedgerState,
    pub after: LedgerState,
}

fn lenient_amount(value: &Option<Value>) -> Option<f64> {
    value.as_ref().and_then(Value::as_f64)
}

fn lenient_count(value: &Option<Value>) -> Option<u64> {
    value.as_ref().and_then(Value::as_u64)
}

/// Backfill the ledger from the on-chain balance.
///
/// Exists for custodial accounts that received funds before this ledger did;
/// only allowed while the tracked balances are empty.
#[utoipa::path(
    post,
    path = "/migrate",
    tag = "Admin",
    responses(
        (status = 200, description = "Ledger migrated", body = MigrateResponse),
        (status = 409, description = "Tracked state is not empty"),
        (status = 503, description = "Chain unreachable")
    )
)]
pub async fn migrate(State(state): State<AppState>) -> Result<Json<MigrateResponse>, ApiError> {
    let outcome = state.ledger.migrate().await?;
    Ok(Json(MigrateResponse {
        migrated_amount: outcome.migrated_amount,
        vault_balance: outcome.vault_balance,
    }))
}

/// Directly set any subset of the four ledger fields, for manual recovery.
#[utoipa::path(
    post,
    path = "/admin/set-state",
    tag = "Admin",
    request_body = SetStateRequest,
    responses(
        (status = 200, description = "Override applied", body = SetStateResponse)
    )
)]
pub async fn set_state(
    State(state): State<AppState>,
    Json(request): Json<SetStateRequest>,
) -> Result<Json<SetStateResponse>, ApiError> {
    let override_request = StateOverride {
        vault_balance: lenient_amount(&request.vault_balance),
        earned_balance: lenient_amount(&request.earned_balance),
        reward_per_cycle: lenient_amount(&request.reward_per_cycle),
        completed_cycles: lenient_count(&request.completed_cycles),
    };

    let outcome = state.ledger.admin_override(override_request).await?;
    Ok(Json(SetStateResponse {
        before: outcome.before,
        after: outcome.after,
    }))
}
