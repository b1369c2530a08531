// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Unit conversion between the ledger's native-unit amounts and wei.
//!
//! The ledger tracks balances as fractional native units (`f64`); the chain
//! operates in wei at a fixed scale of 10^18. Amounts carry at most
//! [`LEDGER_PRECISION`] fractional digits, and conversion always floors, so
//! rounding error can only fall in the custody account's favor.

use alloy::primitives::U256;

/// Decimals of the native unit (AVAX).
pub const NATIVE_DECIMALS: u32 = 18;

/// Fractional digits carried by ledger amounts. Anything finer is floored
/// away during conversion.
pub const LEDGER_PRECISION: u32 = 9;

/// Smallest wei step representable by a ledger amount (10^9 wei).
fn quantum() -> U256 {
    U256::from(10u64).pow(U256::from(NATIVE_DECIMALS - LEDGER_PRECISION))
}

/// Convert a native-unit amount to wei, flooring at [`LEDGER_PRECISION`]
/// fractional digits. Non-finite and non-positive inputs convert to zero.
pub fn to_wei(amount: f64) -> U256 {
    if !amount.is_finite() || amount <= 0.0 {
        return U256::ZERO;
    }
    let scaled = (amount * 10f64.powi(LEDGER_PRECISION as i32)).floor();
    if scaled <= 0.0 {
        return U256::ZERO;
    }
    U256::from(scaled as u128) * quantum()
}

/// Convert wei to a native-unit amount, flooring at [`LEDGER_PRECISION`]
/// fractional digits.
pub fn from_wei(value: U256) -> f64 {
    let units = value / quantum();
    let units = u128::try_from(units).unwrap_or(u128::MAX);
    units as f64 / 10f64.powi(LEDGER_PRECISION as i32)
}
