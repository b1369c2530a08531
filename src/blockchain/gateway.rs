// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The chain gateway seam.
//!
//! Everything the ledger knows about the chain goes through [`ChainGateway`]:
//! balance reads, credit verification, and outgoing transfers. The trait is
//! object-safe so the ledger can hold an `Arc<dyn ChainGateway>` and tests can
//! substitute a scripted gateway.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

/// Errors from chain interactions, including the credit-rejection reasons.
///
/// Verification rejections are ordinary error values: a deposit notification
/// naming a transaction that is missing, unconfirmed, reverted, addressed to
/// someone else, or worthless must be rejected with that specific reason and
/// must leave the ledger untouched.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid transaction signature: {0}")]
    InvalidSignature(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction not found on chain")]
    TxNotFound,

    #[error("Transaction not yet confirmed")]
    TxUnconfirmed,

    #[error("Transaction failed on chain")]
    TxFailed,

    #[error("Transaction recipient is not the custodial account")]
    RecipientMismatch,

    #[error("Transaction carries no positive credit")]
    NonPositiveCredit,

    #[error("Transfer rejected: {0}")]
    TransferRejected(String),

    #[error("Timed out waiting for transfer confirmation")]
    ConfirmationTimeout,
}

/// A confirmed outgoing transfer.
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    /// Hash of the confirmed transaction.
    pub tx_hash: String,
    /// Block the transaction was included in.
    pub block_number: u64,
}

/// Gateway to the external chain.
///
/// Implementations must be all-or-nothing on `transfer`: either a confirmed
/// receipt comes back or a `ChainError`, never a partial result. Every call
/// must complete in bounded time so a stalled node fails the in-flight ledger
/// operation instead of wedging the mutation queue behind it.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Native balance of `address`, in wei.
    async fn native_balance(&self, address: Address) -> Result<U256, ChainError>;

    /// Verify that the transaction named by `tx_hash` is a confirmed,
    /// successful credit to `expected_recipient`, and return the credited
    /// amount in wei.
    ///
    /// The amount is always re-derived from the chain record. Caller-supplied
    /// claims about the amount are never consulted.
    async fn verify_credit(
        &self,
        tx_hash: &str,
        expected_recipient: Address,
    ) -> Result<U256, ChainError>;

    /// Transfer `amount_wei` from the custodial account to `to` and wait for
    /// confirmation.
    async fn transfer(&self, to: Address, amount_wei: U256) -> Result<TransferReceipt, ChainError>;
}

impl ChainError {
    /// Whether this error is a credit-verification rejection (as opposed to a
    /// transport failure).
    pub fn is_credit_rejection(&self) -> bool {
        matches!(
            self,
            ChainError::TxNotFound
                | ChainError::TxUnconfirmed
                | ChainError::TxFailed
                | ChainError::RecipientMismatch
                | ChainError::NonPositiveCredit
        )
    }
}
