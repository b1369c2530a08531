// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;
use crate::storage::LedgerState;

pub mod admin;
pub mod cycle;
pub mod deposit;
pub mod health;
pub mod status;
pub mod vault;
pub mod withdraw;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/vault", get(vault::vault_info))
        .route("/status", get(status::ledger_status))
        .route("/tx-notify", post(deposit::notify_deposit))
        .route("/complete-cycle", post(cycle::complete_cycle))
        .route(
            "/config",
            get(cycle::get_reward_config).post(cycle::set_reward_config),
        )
        .route("/withdraw", post(withdraw::withdraw))
        .route("/migrate", post(admin::migrate))
        .route("/admin/set-state", post(admin::set_state))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        vault::vault_info,
        status::ledger_status,
        deposit::notify_deposit,
        cycle::complete_cycle,
        cycle::get_reward_config,
        cycle::set_reward_config,
        withdraw::withdraw,
        admin::migrate,
        admin::set_state,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            vault::VaultInfoResponse,
            status::StatusResponse,
            deposit::DepositNotifyRequest,
            deposit::DepositNotifyResponse,
            cycle::CompleteCycleResponse,
            cycle::RewardConfigResponse,
            cycle::SetRewardConfigRequest,
            withdraw::WithdrawRequest,
            withdraw::WithdrawResponse,
            admin::MigrateResponse,
            admin::SetStateRequest,
            admin::SetStateResponse,
            LedgerState,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Vault", description = "Custodial account information"),
        (name = "Status", description = "Ledger reconciliation"),
        (name = "Deposits", description = "Deposit verification and crediting"),
        (name = "Cycles", description = "Cycle completion and reward configuration"),
        (name = "Withdrawals", description = "Earned balance withdrawal"),
        (name = "Admin", description = "Migration and manual recovery"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;
