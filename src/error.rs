// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP error envelope.
//!
//! Every rejection carries a machine-checkable `reason` string and, where a
//! caller needs it to resynchronize, the current authoritative balance.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::blockchain::ChainError;
use crate::ledger::LedgerError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub reason: &'static str,
    pub message: String,
    pub earned_balance: Option<f64>,
    pub vault_balance: Option<f64>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    reason: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    earned_balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vault_balance: Option<f64>,
}

impl ApiError {
    pub fn new(status: StatusCode, reason: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            reason,
            message: message.into(),
            earned_balance: None,
            vault_balance: None,
        }
    }

    pub fn bad_request(reason: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, reason, message)
    }

    pub fn conflict(reason: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, reason, message)
    }

    pub fn unprocessable(reason: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, reason, message)
    }

    pub fn bad_gateway(reason: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, reason, message)
    }

    pub fn service_unavailable(reason: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, reason, message)
    }

    pub fn internal(reason: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, reason, message)
    }

    pub fn with_earned_balance(mut self, balance: f64) -> Self {
        self.earned_balance = Some(balance);
        self
    }

    pub fn with_vault_balance(mut self, balance: f64) -> Self {
        self.vault_balance = Some(balance);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            reason: self.reason,
            earned_balance: self.earned_balance,
            vault_balance: self.vault_balance,
        });
        (self.status, body).into_response()
    }
}

/// Reason string for a credit-verification rejection.
fn credit_rejection_reason(error: &ChainError) -> &'static str {
    match error {
        ChainError::TxNotFound => "tx-not-found",
        ChainError::TxUnconfirmed => "tx-unconfirmed",
        ChainError::TxFailed => "tx-failed",
        ChainError::RecipientMismatch => "recipient-mismatch",
        ChainError::NonPositiveCredit => "non-positive-credit",
        _ => "credit-rejected",
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::MissingSignature => Self::bad_request("missing-signature", message),
            LedgerError::ReplayedSignature => Self::conflict("replayed-signature", message),
            LedgerError::CreditRejected(reason) => {
                Self::unprocessable(credit_rejection_reason(&reason), message)
            }
            LedgerError::VaultEmpty => Self::conflict("vault-empty", message),
            LedgerError::InvalidAddress => Self::bad_request("invalid-address", message),
            LedgerError::NonPositiveAmount => Self::bad_request("non-positive-amount", message),
            LedgerError::InsufficientEarned { available } => {
                Self::conflict("insufficient-earned-balance", message)
                    .with_earned_balance(available)
            }
            LedgerError::InsufficientChainBalance { .. } => {
                Self::conflict("insufficient-chain-balance", message)
            }
            LedgerError::TransferFailed { earned_balance, .. } => {
                Self::bad_gateway("transfer-failed", message).with_earned_balance(earned_balance)
            }
            LedgerError::MigrationNotNeeded { .. } => {
                Self::conflict("migration-not-needed", message)
            }
            LedgerError::NegativeReward => Self::bad_request("negative-reward", message),
            LedgerError::Chain(ChainError::InvalidSignature(_)) => {
                Self::bad_request("invalid-signature", message)
            }
            LedgerError::Chain(_) => Self::service_unavailable("chain-unreachable", message),
            LedgerError::Storage(_) => Self::internal("storage-failure", message),
        }
    }
}
