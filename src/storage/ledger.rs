// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger state and its on-disk store.
//!
//! The state is one small JSON record, read whole on startup and rewritten
//! atomically (tmp + rename) after every successful mutation. Loading is
//! lenient per field: a value of the wrong type falls back to that field's
//! default instead of rejecting the file, while a file that is not JSON at
//! all is an error. Balances clamp to zero on every persist.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::config::DEFAULT_REWARD_PER_CYCLE;

use super::paths::StoragePaths;
use super::StorageError;

/// Tolerance for balance comparisons. Two amounts closer than this are the
/// same amount.
pub const BALANCE_EPSILON: f64 = 1e-9;

/// The two-balance ledger record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LedgerState {
    /// Value deposited but not yet earned, in native units.
    pub vault_balance: f64,
    /// Value unlocked and eligible for withdrawal, in native units.
    pub earned_balance: f64,
    /// Value moved vault -> earned per completed cycle.
    pub reward_per_cycle: f64,
    /// Completed-cycle counter, monotonic.
    pub completed_cycles: u64,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self::new(DEFAULT_REWARD_PER_CYCLE)
    }
}

impl LedgerState {
    /// Fresh zero-balance state with the given reward configuration.
    pub fn new(reward_per_cycle: f64) -> Self {
        Self {
            vault_balance: 0.0,
            earned_balance: 0.0,
            reward_per_cycle: reward_per_cycle.max(0.0),
            completed_cycles: 0,
        }
    }

    /// Sum of both tracked balances.
    pub fn total(&self) -> f64 {
        self.vault_balance + self.earned_balance
    }

    /// Whether the tracked balances are empty (within epsilon).
    pub fn is_empty(&self) -> bool {
        self.total() <= BALANCE_EPSILON
    }

    /// Copy with every field clamped to its valid range.
    pub fn clamped(&self) -> Self {
        Self {
            vault_balance: clamp_amount(self.vault_balance),
            earned_balance: clamp_amount(self.earned_balance),
            reward_per_cycle: clamp_amount(self.reward_per_cycle),
            completed_cycles: self.completed_cycles,
        }
    }

    /// Lenient extraction from parsed JSON: a missing or type-invalid field
    /// loads its default.
    fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        Self {
            vault_balance: field_f64(value, "vault_balance", defaults.vault_balance),
            earned_balance: field_f64(value, "earned_balance", defaults.earned_balance),
            reward_per_cycle: field_f64(value, "reward_per_cycle", defaults.reward_per_cycle),
            completed_cycles: value
                .get("completed_cycles")
                .and_then(Value::as_u64)
                .unwrap_or(defaults.completed_cycles),
        }
    }
}

fn field_f64(value: &Value, key: &str, default: f64) -> f64 {
    value
        .get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn clamp_amount(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// On-disk store for the ledger state.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(paths: &StoragePaths) -> Self {
        Self {
            path: paths.ledger_state(),
        }
    }

    /// Load the persisted state, or return `fresh` if no state file exists
    /// yet. A file that is not valid JSON is an error, not a reset.
    pub fn load_or(&self, fresh: LedgerState) -> Result<LedgerState, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let value: Value = serde_json::from_str(&text)?;
                Ok(LedgerState::from_value(&value).clamped())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(fresh),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the state atomically, clamping balances to their valid range.
    pub fn save(&self, state: &LedgerState) -> Result<(), StorageError> {
        let state = state.clamped();

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to temp file first, then rename for atomicity.
        let temp_path = self.path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &state)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}
