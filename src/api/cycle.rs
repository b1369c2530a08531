// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cycle completion and reward configuration endpoints.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::ApiError, state::AppState};

/// Result of a completed work cycle.
#[derive(Debug, Serialize, ToSchema)]
pub struct CompleteCycleResponse {
    /// Amount moved vault -> earned for this cycle.
    pub reward_paid: f64,
    /// True when the vault ran dry before covering the configured reward.
    pub partial: bool,
    pub vault_balance: f64,
    pub earned_balance: f64,
    pub completed_cycles: u64,
}

/// Reward configuration.
#[derive(Debug, Serialize, ToSchema)]
pub struct RewardConfigResponse {
    /// Amount moved vault -> earned per completed cycle, in native units.
    pub reward_per_cycle: f64,
}

/// Request to update the reward configuration.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetRewardConfigRequest {
    #[serde(alias = "rewardPerCycle")]
    pub reward_per_cycle: f64,
}

/// Record one completed work cycle, moving the reward from vault to earned.
#[utoipa::path(
    post,
    path = "/complete-cycle",
    tag = "Cycles",
    responses(
        (status = 200, description = "Cycle recorded", body = CompleteCycleResponse),
        (status = 409, description = "Vault is empty")
    )
)]
pub async fn complete_cycle(
    State(state): State<AppState>,
) -> Result<Json<CompleteCycleResponse>, ApiError> {
    let outcome = state.ledger.complete_cycle().await?;
    Ok(Json(CompleteCycleResponse {
        reward_paid: outcome.reward_paid,
        partial: outcome.partial,
        vault_balance: outcome.vault_balance,
        earned_balance: outcome.earned_balance,
        completed_cycles: outcome.completed_cycles,
    }))
}

/// Get the current reward configuration.
#[utoipa::path(
    get,
    path = "/config",
    tag = "Cycles",
    responses(
        (status = 200, description = "Current reward configuration", body = RewardConfigResponse)
    )
)]
pub async fn get_reward_config(State(state): State<AppState>) -> Json<RewardConfigResponse> {
    Json(RewardConfigResponse {
        reward_per_cycle: state.ledger.reward_per_cycle(),
    })
}

/// Update the reward configuration.
#[utoipa::path(
    post,
    path = "/config",
    tag = "Cycles",
    request_body = SetRewardConfigRequest,
    responses(
        (status = 200, description = "Reward configuration updated", body = RewardConfigResponse),
        (status = 400, description = "Negative reward value")
    )
)]
pub async fn set_reward_config(
    State(state): State<AppState>,
    Json(request): Json<SetRewardConfigRequest>,
) -> Result<Json<RewardConfigResponse>, ApiError> {
    let reward = state
        .ledger
        .set_reward_per_cycle(request.reward_per_cycle)
        .await?;
    Ok(Json(RewardConfigResponse {
        reward_per_cycle: reward,
    }))
}
