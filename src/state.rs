// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::ledger::LedgerService;

/// Shared application state injected into request handlers.
///
/// The ledger handle is explicitly owned here, never global: handlers receive
/// it through axum's `State` extractor, and tests build their own with a mock
/// chain gateway.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<LedgerService>,
}

impl AppState {
    pub fn new(ledger: Arc<LedgerService>) -> Self {
        Self { ledger }
    }
}
