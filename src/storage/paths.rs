// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the persistent storage layout.

use std::path::{Path, PathBuf};

/// Base directory for all persistent storage.
pub const DATA_ROOT: &str = "/data";

/// Storage path utilities for the data directory.
///
/// Exactly two files live here: the custody private key and the
/// JSON-serialized ledger state.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persistent data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the custody key.
    pub fn custody_dir(&self) -> PathBuf {
        self.root.join("custody")
    }

    /// Path to the custodial account's private key file.
    pub fn custody_key(&self) -> PathBuf {
        self.custody_dir().join("key.pem")
    }

    /// Directory holding the ledger state.
    pub fn ledger_dir(&self) -> PathBuf {
        self.root.join("ledger")
    }

    /// Path to the ledger state file.
    pub fn ledger_state(&self) -> PathBuf {
        self.ledger_dir().join("state.json")
    }
}
