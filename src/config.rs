// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! `Config` snapshot loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for persistent storage | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `CHAIN_NETWORK` | Chain to settle on (`fuji` or `mainnet`) | `fuji` |
//! | `CHAIN_RPC_URL` | RPC endpoint override | network preset |
//! | `REWARD_PER_CYCLE` | Reward for a freshly created ledger | `0.001` |
//! | `WITHDRAW_FEE_RESERVE` | Native units held back for transfer fees | `0.001` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;

/// Environment variable name for the persistent data directory path.
///
/// The custody key and the ledger state file live under this directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable selecting the settlement network.
pub const CHAIN_NETWORK_ENV: &str = "CHAIN_NETWORK";

/// Environment variable overriding the RPC endpoint of the selected network.
pub const CHAIN_RPC_URL_ENV: &str = "CHAIN_RPC_URL";

/// Environment variable for the reward seeded into a fresh ledger.
pub const REWARD_PER_CYCLE_ENV: &str = "REWARD_PER_CYCLE";

/// Environment variable for the fee reserve withheld from withdrawals.
pub const WITHDRAW_FEE_RESERVE_ENV: &str = "WITHDRAW_FEE_RESERVE";

/// Default data directory.
pub const DEFAULT_DATA_DIR: &str = "/data";

/// Default reward moved vault -> earned per completed cycle, in native units.
pub const DEFAULT_REWARD_PER_CYCLE: f64 = 0.001;

/// Default fee reserve: the on-chain balance must exceed a withdrawal by this
/// many native units so the transfer itself can pay for gas.
pub const DEFAULT_WITHDRAW_FEE_RESERVE: f64 = 0.001;

/// Configuration snapshot taken from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for the custody key and ledger state files.
    pub data_dir: String,
    /// Server bind host.
    pub host: String,
    /// Server bind port.
    pub port: u16,
    /// Settlement network name (`fuji` or `mainnet`).
    pub chain_network: String,
    /// Optional RPC endpoint override.
    pub chain_rpc_url: Option<String>,
    /// Reward per cycle seeded into a freshly created ledger.
    pub reward_per_cycle: f64,
    /// Native units withheld from the on-chain balance for transfer fees.
    pub withdraw_fee_reserve: f64,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let chain_network =
            env::var(CHAIN_NETWORK_ENV).unwrap_or_else(|_| "fuji".to_string());
        let chain_rpc_url = env::var(CHAIN_RPC_URL_ENV).ok();
        let reward_per_cycle = env::var(REWARD_PER_CYCLE_ENV)
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(DEFAULT_REWARD_PER_CYCLE);
        let withdraw_fee_reserve = env::var(WITHDRAW_FEE_RESERVE_ENV)
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(DEFAULT_WITHDRAW_FEE_RESERVE);

        Self {
            data_dir,
            host,
            port,
            chain_network,
            chain_rpc_url,
            reward_per_cycle,
            withdraw_fee_reserve,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            chain_network: "fuji".to_string(),
            chain_rpc_url: None,
            reward_per_cycle: DEFAULT_REWARD_PER_CYCLE,
            withdraw_fee_reserve: DEFAULT_WITHDRAW_FEE_RESERVE,
        }
    }
}
