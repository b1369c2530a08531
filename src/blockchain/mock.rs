// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scriptable in-memory chain gateway for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use super::gateway::{ChainError, ChainGateway, TransferReceipt};
use super::units::to_wei;

#[derive(Default)]
struct Inner {
    balance: U256,
    credits: HashMap<String, (Address, U256)>,
    credit_rejections: HashMap<String, ChainError>,
    transfer_failures: VecDeque<ChainError>,
    transfer_delay: Duration,
    sent: Vec<(Address, U256)>,
}

/// In-memory gateway with a scriptable on-chain balance, credit records, and
/// transfer outcomes. Delays let tests exercise interleavings across the
/// sequencer's await points.
pub(crate) struct MockChain {
    inner: Mutex<Inner>,
}

impl MockChain {
    pub(crate) fn new(balance: f64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                balance: to_wei(balance),
                ..Inner::default()
            }),
        }
    }

    pub(crate) fn set_balance(&self, balance: f64) {
        self.inner.lock().unwrap().balance = to_wei(balance);
    }

    /// Record a confirmed on-chain credit of `amount` to `recipient` under
    /// transaction hash `tx_hash`.
    pub(crate) fn add_credit(&self, tx_hash: &str, recipient: Address, amount: f64) {
        self.inner
            .lock()
            .unwrap()
            .credits
            .insert(tx_hash.to_string(), (recipient, to_wei(amount)));
    }

    /// Make verification of `tx_hash` fail with `error`.
    pub(crate) fn reject_credit(&self, tx_hash: &str, error: ChainError) {
        self.inner
            .lock()
            .unwrap()
            .credit_rejections
            .insert(tx_hash.to_string(), error);
    }

    /// Queue a failure for the next transfer; later transfers succeed again.
    pub(crate) fn fail_next_transfer(&self, error: ChainError) {
        self.inner.lock().unwrap().transfer_failures.push_back(error);
    }

    /// Delay every transfer, to widen the window between a withdrawal's
    /// balance deduction and its confirmation.
    pub(crate) fn set_transfer_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().transfer_delay = delay;
    }

    /// Transfers that reached the chain, in submission order.
    pub(crate) fn sent_transfers(&self) -> Vec<(Address, U256)> {
        self.inner.lock().unwrap().sent.clone()
    }
}

#[async_trait]
impl ChainGateway for MockChain {
    async fn native_balance(&self, _address: Address) -> Result<U256, ChainError> {
        Ok(self.inner.lock().unwrap().balance)
    }

    async fn verify_credit(
        &self,
        tx_hash: &str,
        expected_recipient: Address,
    ) -> Result<U256, ChainError> {
        let inner = self.inner.lock().unwrap();
        if let Some(error) = inner.credit_rejections.get(tx_hash) {
            return Err(error.clone());
        }
        match inner.credits.get(tx_hash) {
            Some((recipient, value)) if *recipient == expected_recipient => Ok(*value),
            Some(_) => Err(ChainError::RecipientMismatch),
            None => Err(ChainError::TxNotFound),
        }
    }

    async fn transfer(&self, to: Address, amount_wei: U256) -> Result<TransferReceipt, ChainError> {
        let delay = self.inner.lock().unwrap().transfer_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.transfer_failures.pop_front() {
            return Err(error);
        }

        inner.balance = inner.balance.saturating_sub(amount_wei);
        inner.sent.push((to, amount_wei));
        let tx_hash = format!("0x{:064x}", inner.sent.len());

        Ok(TransferReceipt {
            tx_hash,
            block_number: inner.sent.len() as u64,
        })
    }
}
