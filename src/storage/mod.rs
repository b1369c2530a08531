// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Persistent Storage Module
//!
//! Two independent files, both read whole into memory on startup and
//! rewritten atomically on mutation:
//!
//! ```text
//! <DATA_DIR>/
//!   custody/key.pem      # Custodial private key (0600, NEVER exposed via API)
//!   ledger/state.json    # JSON-serialized LedgerState
//! ```
//!
//! The custody key is loaded once and never regenerated while a file claiming
//! to hold it exists; the ledger state loads leniently per field and clamps
//! balances on every save.

pub mod custody;
pub mod ledger;
pub mod paths;

pub use custody::{CustodyError, CustodyKey, CustodyStore};
pub use ledger::{LedgerState, LedgerStore, BALANCE_EPSILON};
pub use paths::StoragePaths;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
