// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, sync::Arc};

use tracing_subscriber::EnvFilter;

use vault_ledger_server::{
    api::router,
    blockchain::{EvmGateway, NetworkConfig},
    config::Config,
    ledger::LedgerService,
    state::AppState,
    storage::{CustodyStore, LedgerState, LedgerStore, StoragePaths},
};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env();
    let paths = StoragePaths::new(&config.data_dir);

    // Custody key: loaded, or created on a genuinely fresh data directory. A
    // key file that exists but cannot be parsed aborts startup here.
    let custody = CustodyStore::new(paths.clone())
        .load_or_create()
        .expect("custody key unavailable");
    tracing::info!(address = %custody.address(), "custody account ready");

    let store = LedgerStore::new(&paths);
    let initial = store
        .load_or(LedgerState::new(config.reward_per_cycle))
        .expect("ledger state file unreadable");
    tracing::info!(
        vault = initial.vault_balance,
        earned = initial.earned_balance,
        cycles = initial.completed_cycles,
        "ledger state loaded"
    );

    let network = NetworkConfig::for_name(&config.chain_network)
        .expect("unknown CHAIN_NETWORK (expected `fuji` or `mainnet`)");
    let network = match &config.chain_rpc_url {
        Some(url) => network.with_rpc_url(url),
        None => network,
    };
    tracing::info!(network = network.name, rpc = %network.rpc_url, "chain gateway configured");

    let gateway =
        EvmGateway::new(network, custody.wallet()).expect("failed to build chain gateway");

    let ledger = Arc::new(LedgerService::new(
        custody.address(),
        Arc::new(gateway),
        store,
        initial,
        config.withdraw_fee_reserve,
    ));

    let app = router(AppState::new(ledger));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!(%addr, "vault ledger server listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match env::var("LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    tracing::info!("shutdown signal received");
}
