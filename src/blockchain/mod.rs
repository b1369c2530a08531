// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for Avalanche C-Chain.
//!
//! This module is the only part of the service that talks to the chain:
//! - Querying the custodial account's native balance
//! - Verifying inbound credits against the on-chain record
//! - Signing and broadcasting outbound transfers

pub mod client;
pub mod gateway;
pub mod units;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{EvmGateway, NetworkConfig};
pub use gateway::{ChainError, ChainGateway, TransferReceipt};
pub use units::{from_wei, to_wei};
