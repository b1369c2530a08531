// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The ledger service: every operation that reads or mutates the custodial
//! value ledger.
//!
//! Mutations (deposit-notify, cycle-complete, withdraw, migrate,
//! admin-override, reward config) run inside the [`MutationSequencer`]'s
//! critical sections and persist before responding. Read-only paths (status,
//! vault info) never touch the sequencer: they answer from the last persisted
//! snapshot plus a live chain query, and disclose staleness through the
//! discrepancy field.

pub mod sequencer;

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex, RwLock};

use alloy::primitives::Address;

use crate::blockchain::{from_wei, to_wei, ChainError, ChainGateway};
use crate::storage::{LedgerState, LedgerStore, StorageError, BALANCE_EPSILON};

use sequencer::MutationSequencer;

/// Errors from ledger operations.
///
/// Business-rule violations carry the current authoritative balance where a
/// caller needs it to resynchronize without a second round trip.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("transaction signature is required")]
    MissingSignature,

    #[error("transaction signature was already credited")]
    ReplayedSignature,

    #[error("deposit verification rejected: {0}")]
    CreditRejected(ChainError),

    #[error("vault is empty")]
    VaultEmpty,

    #[error("invalid destination address")]
    InvalidAddress,

    #[error("amount must be a positive number")]
    NonPositiveAmount,

    #[error("insufficient earned balance ({available} available)")]
    InsufficientEarned { available: f64 },

    #[error("insufficient on-chain balance ({available} available after fee reserve)")]
    InsufficientChainBalance { available: f64 },

    #[error("transfer failed, earned balance restored: {reason}")]
    TransferFailed { reason: String, earned_balance: f64 },

    #[error("migration not needed: ledger already tracks {tracked}")]
    MigrationNotNeeded { tracked: f64 },

    #[error("reward per cycle must not be negative")]
    NegativeReward,

    #[error("chain unreachable: {0}")]
    Chain(ChainError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result of a verified deposit notification.
#[derive(Debug, Clone)]
pub struct DepositOutcome {
    /// Amount credited, re-derived from the chain record.
    pub verified_amount: f64,
    pub vault_balance: f64,
    pub earned_balance: f64,
}

/// Result of a completed work cycle.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// Amount actually moved vault -> earned.
    pub reward_paid: f64,
    /// True when the vault ran dry before covering the configured reward.
    pub partial: bool,
    pub vault_balance: f64,
    pub earned_balance: f64,
    pub completed_cycles: u64,
}

/// Result of a confirmed withdrawal.
#[derive(Debug, Clone)]
pub struct WithdrawOutcome {
    pub tx_hash: String,
    pub earned_balance: f64,
}

/// Result of the one-time ledger migration.
#[derive(Debug, Clone)]
pub struct MigrateOutcome {
    pub migrated_amount: f64,
    pub vault_balance: f64,
}

/// Before/after snapshot of an admin override.
#[derive(Debug, Clone)]
pub struct OverrideOutcome {
    pub before: LedgerState,
    pub after: LedgerState,
}

/// Fields an admin override may set. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct StateOverride {
    pub vault_balance: Option<f64>,
    pub earned_balance: Option<f64>,
    pub reward_per_cycle: Option<f64>,
    pub completed_cycles: Option<u64>,
}

/// Read-only reconciliation report.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub vault_balance: f64,
    pub earned_balance: f64,
    pub total_tracked: f64,
    pub on_chain_balance: f64,
    /// Signed difference `on_chain - (vault + earned)`. Reported, never
    /// silently corrected.
    pub discrepancy: f64,
    pub completed_cycles: u64,
}

/// Custodial account information.
#[derive(Debug, Clone)]
pub struct VaultInfo {
    pub address: String,
    pub on_chain_balance: f64,
}

/// The custodial value ledger.
///
/// Explicitly owned and injected into request handlers; holds the only
/// references to the sequenced state, the state store, and the chain gateway.
pub struct LedgerService {
    address: Address,
    chain: Arc<dyn ChainGateway>,
    store: LedgerStore,
    sequencer: MutationSequencer<LedgerState>,
    /// Last persisted state, for unsequenced reads.
    snapshot: Arc<RwLock<LedgerState>>,
    /// Replay guard: signatures already credited this process lifetime.
    processed: Arc<StdMutex<HashSet<String>>>,
    fee_reserve: f64,
}

impl LedgerService {
    pub fn new(
        address: Address,
        chain: Arc<dyn ChainGateway>,
        store: LedgerStore,
        initial: LedgerState,
        fee_reserve: f64,
    ) -> Self {
        Self {
            address,
            chain,
            store,
            snapshot: Arc::new(RwLock::new(initial.clone())),
            sequencer: MutationSequencer::new(initial),
            processed: Arc::new(StdMutex::new(HashSet::new())),
            fee_reserve: fee_reserve.max(0.0),
        }
    }

    /// Public address of the custodial account.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Last persisted ledger state.
    pub fn tracked_state(&self) -> LedgerState {
        self.snapshot.read().expect("snapshot lock poisoned").clone()
    }

    /// Credit a deposit after verifying it against the chain record.
    ///
    /// Verification happens before the critical section so the queue is not
    /// held across the lookup; the replay check is then re-run inside it,
    /// which is what keeps two racing notifications for the same signature
    /// from both crediting.
    pub async fn deposit_notify(&self, signature: &str) -> Result<DepositOutcome, LedgerError> {
        let signature = signature.trim();
        if signature.is_empty() {
            return Err(LedgerError::MissingSignature);
        }
        if self
            .processed
            .lock()
            .expect("replay set lock poisoned")
            .contains(signature)
        {
            return Err(LedgerError::ReplayedSignature);
        }

        let verified_wei = self
            .chain
            .verify_credit(signature, self.address)
            .await
            .map_err(|e| {
                if e.is_credit_rejection() {
                    LedgerError::CreditRejected(e)
                } else {
                    LedgerError::Chain(e)
                }
            })?;
        let verified_amount = from_wei(verified_wei);
        if verified_amount <= 0.0 {
            return Err(LedgerError::CreditRejected(ChainError::NonPositiveCredit));
        }

        let store = self.store.clone();
        let snapshot = Arc::clone(&self.snapshot);
        let processed = Arc::clone(&self.processed);
        let signature = signature.to_string();
        self.sequencer
            .enqueue(move |mut ledger| async move {
                if !processed
                    .lock()
                    .expect("replay set lock poisoned")
                    .insert(signature)
                {
                    return Err(LedgerError::ReplayedSignature);
                }

                ledger.vault_balance += verified_amount;
                persist(&store, &snapshot, &ledger);

                Ok(DepositOutcome {
                    verified_amount,
                    vault_balance: ledger.vault_balance,
                    earned_balance: ledger.earned_balance,
                })
            })
            .await
    }

    /// Move one cycle's reward from vault to earned.
    pub async fn complete_cycle(&self) -> Result<CycleOutcome, LedgerError> {
        let store = self.store.clone();
        let snapshot = Arc::clone(&self.snapshot);
        self.sequencer
            .enqueue(move |mut ledger| async move {
                if ledger.vault_balance <= BALANCE_EPSILON {
                    return Err(LedgerError::VaultEmpty);
                }

                let reward = ledger.reward_per_cycle;
                let paid = reward.min(ledger.vault_balance);
                ledger.vault_balance = (ledger.vault_balance - paid).max(0.0);
                ledger.earned_balance += paid;
                ledger.completed_cycles += 1;
                persist(&store, &snapshot, &ledger);

                Ok(CycleOutcome {
                    reward_paid: paid,
                    partial: paid + BALANCE_EPSILON < reward,
                    vault_balance: ledger.vault_balance,
                    earned_balance: ledger.earned_balance,
                    completed_cycles: ledger.completed_cycles,
                })
            })
            .await
    }

    /// Withdraw earned balance to `to`.
    ///
    /// The deduction is persisted *before* the transfer is submitted, so a
    /// second withdrawal queued behind this one can never observe the
    /// pre-transfer balance. If the transfer then fails, the failure branch
    /// re-credits the deduction and persists again.
    pub async fn withdraw(&self, to: &str, amount: f64) -> Result<WithdrawOutcome, LedgerError> {
        // Cheap validation, outside the sequencer, no side effects.
        let to: Address = to
            .trim()
            .parse()
            .map_err(|_| LedgerError::InvalidAddress)?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LedgerError::NonPositiveAmount);
        }

        let chain = Arc::clone(&self.chain);
        let store = self.store.clone();
        let snapshot = Arc::clone(&self.snapshot);
        let custody = self.address;
        let fee_reserve = self.fee_reserve;
        self.sequencer
            .enqueue(move |mut ledger| async move {
                if amount > ledger.earned_balance + BALANCE_EPSILON {
                    return Err(LedgerError::InsufficientEarned {
                        available: ledger.earned_balance,
                    });
                }

                let on_chain = from_wei(
                    chain
                        .native_balance(custody)
                        .await
                        .map_err(LedgerError::Chain)?,
                );
                if on_chain + BALANCE_EPSILON < amount + fee_reserve {
                    return Err(LedgerError::InsufficientChainBalance {
                        available: (on_chain - fee_reserve).max(0.0),
                    });
                }

                ledger.earned_balance = (ledger.earned_balance - amount).max(0.0);
                persist(&store, &snapshot, &ledger);

                match chain.transfer(to, to_wei(amount)).await {
                    Ok(receipt) => Ok(WithdrawOutcome {
                        tx_hash: receipt.tx_hash,
                        earned_balance: ledger.earned_balance,
                    }),
                    Err(error) => {
                        // Compensate: restore the deduction, then report.
                        ledger.earned_balance += amount;
                        persist(&store, &snapshot, &ledger);
                        tracing::warn!(%error, amount, "withdrawal transfer failed, earned balance restored");
                        Err(LedgerError::TransferFailed {
                            reason: error.to_string(),
                            earned_balance: ledger.earned_balance,
                        })
                    }
                }
            })
            .await
    }

    /// One-time bootstrap: adopt the on-chain balance as the vault balance.
    ///
    /// Only allowed while the tracked balances are empty; anything else must
    /// go through admin override, which logs its before/after snapshot.
    pub async fn migrate(&self) -> Result<MigrateOutcome, LedgerError> {
        let chain = Arc::clone(&self.chain);
        let store = self.store.clone();
        let snapshot = Arc::clone(&self.snapshot);
        let custody = self.address;
        self.sequencer
            .enqueue(move |mut ledger| async move {
                if !ledger.is_empty() {
                    return Err(LedgerError::MigrationNotNeeded {
                        tracked: ledger.total(),
                    });
                }

                let on_chain = from_wei(
                    chain
                        .native_balance(custody)
                        .await
                        .map_err(LedgerError::Chain)?,
                );
                ledger.vault_balance = on_chain;
                ledger.earned_balance = 0.0;
                persist(&store, &snapshot, &ledger);
                tracing::info!(migrated = on_chain, "ledger migrated from on-chain balance");

                Ok(MigrateOutcome {
                    migrated_amount: on_chain,
                    vault_balance: ledger.vault_balance,
                })
            })
            .await
    }

    /// Directly set any subset of the ledger fields, clamped to valid
    /// ranges, for manual recovery.
    pub async fn admin_override(
        &self,
        request: StateOverride,
    ) -> Result<OverrideOutcome, LedgerError> {
        let store = self.store.clone();
        let snapshot = Arc::clone(&self.snapshot);
        self.sequencer
            .enqueue(move |mut ledger| async move {
                let before = ledger.clone();

                if let Some(v) = request.vault_balance.filter(|v| v.is_finite()) {
                    ledger.vault_balance = v.max(0.0);
                }
                if let Some(v) = request.earned_balance.filter(|v| v.is_finite()) {
                    ledger.earned_balance = v.max(0.0);
                }
                if let Some(v) = request.reward_per_cycle.filter(|v| v.is_finite()) {
                    ledger.reward_per_cycle = v.max(0.0);
                }
                if let Some(v) = request.completed_cycles {
                    ledger.completed_cycles = v;
                }

                persist(&store, &snapshot, &ledger);
                let after = ledger.clone();
                tracing::warn!(?before, ?after, "admin override applied to ledger state");

                Ok(OverrideOutcome { before, after })
            })
            .await
    }

    /// Current reward configuration.
    pub fn reward_per_cycle(&self) -> f64 {
        self.snapshot
            .read()
            .expect("snapshot lock poisoned")
            .reward_per_cycle
    }

    /// Update the reward configuration.
    pub async fn set_reward_per_cycle(&self, reward: f64) -> Result<f64, LedgerError> {
        if !reward.is_finite() || reward < 0.0 {
            return Err(LedgerError::NegativeReward);
        }

        let store = self.store.clone();
        let snapshot = Arc::clone(&self.snapshot);
        self.sequencer
            .enqueue(move |mut ledger| async move {
                ledger.reward_per_cycle = reward;
                persist(&store, &snapshot, &ledger);
                Ok(reward)
            })
            .await
    }

    /// Reconciliation report: tracked balances against the chain.
    pub async fn status(&self) -> Result<StatusReport, LedgerError> {
        let state = self.tracked_state();
        let on_chain = from_wei(
            self.chain
                .native_balance(self.address)
                .await
                .map_err(LedgerError::Chain)?,
        );

        Ok(StatusReport {
            vault_balance: state.vault_balance,
            earned_balance: state.earned_balance,
            total_tracked: state.total(),
            on_chain_balance: on_chain,
            discrepancy: on_chain - state.total(),
            completed_cycles: state.completed_cycles,
        })
    }

    /// Custodial address and live on-chain balance.
    pub async fn vault_info(&self) -> Result<VaultInfo, LedgerError> {
        let on_chain = from_wei(
            self.chain
                .native_balance(self.address)
                .await
                .map_err(LedgerError::Chain)?,
        );
        Ok(VaultInfo {
            address: self.address.to_string(),
            on_chain_balance: on_chain,
        })
    }
}

/// Publish the mutated state to the read snapshot and persist it.
///
/// A persist failure is logged for the operator but does not revert the
/// in-memory mutation: the operation's effect has already been decided and
/// will be reported to the caller as applied.
fn persist(store: &LedgerStore, snapshot: &RwLock<LedgerState>, state: &LedgerState) {
    *snapshot.write().expect("snapshot lock poisoned") = state.clone();
    if let Err(error) = store.save(state) {
        tracing::error!(
            %error,
            "failed to persist ledger state; in-memory ledger has diverged from disk and requires operator attention"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tempfile::TempDir;

    use crate::blockchain::mock::MockChain;
    use crate::storage::StoragePaths;

    const DEST: &str = "0x2222222222222222222222222222222222222222";

    fn custody_address() -> Address {
        Address::repeat_byte(0x11)
    }

    fn service_with(chain: Arc<MockChain>) -> (Arc<LedgerService>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = LedgerStore::new(&StoragePaths::new(dir.path()));
        let service = LedgerService::new(
            custody_address(),
            chain,
            store,
            LedgerState::new(0.001),
            0.001,
        );
        (Arc::new(service), dir)
    }

    async fn seed_earned(service: &LedgerService, amount: f64) {
        service
            .admin_override(StateOverride {
                earned_balance: Some(amount),
                ..StateOverride::default()
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn deposit_credits_verified_amount_exactly_once() {
        let chain = Arc::new(MockChain::new(10.0));
        chain.add_credit("0xaaa", custody_address(), 0.25);
        let (service, _dir) = service_with(Arc::clone(&chain));

        let outcome = service.deposit_notify("0xaaa").await.unwrap();
        assert_eq!(outcome.verified_amount, 0.25);
        assert_eq!(outcome.vault_balance, 0.25);

        // Same signature again: replay, no second credit.
        let err = service.deposit_notify("0xaaa").await.unwrap_err();
        assert!(matches!(err, LedgerError::ReplayedSignature));
        assert_eq!(service.tracked_state().vault_balance, 0.25);
    }

    #[tokio::test]
    async fn concurrent_deposits_of_same_signature_credit_once() {
        let chain = Arc::new(MockChain::new(10.0));
        chain.add_credit("0xbbb", custody_address(), 1.0);
        let (service, _dir) = service_with(Arc::clone(&chain));

        let (a, b) = tokio::join!(
            {
                let service = Arc::clone(&service);
                async move { service.deposit_notify("0xbbb").await }
            },
            {
                let service = Arc::clone(&service);
                async move { service.deposit_notify("0xbbb").await }
            }
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert_eq!(service.tracked_state().vault_balance, 1.0);
    }

    #[tokio::test]
    async fn deposit_uses_chain_amount_not_caller_claim() {
        // The caller's claimed amount never reaches the service; only the
        // chain record does. A credit of 0.1 is what gets credited.
        let chain = Arc::new(MockChain::new(10.0));
        chain.add_credit("0xccc", custody_address(), 0.1);
        let (service, _dir) = service_with(chain);

        let outcome = service.deposit_notify("0xccc").await.unwrap();
        assert_eq!(outcome.verified_amount, 0.1);
    }

    #[tokio::test]
    async fn deposit_rejections_leave_state_untouched() {
        let chain = Arc::new(MockChain::new(10.0));
        chain.add_credit("0xother", Address::repeat_byte(0x99), 5.0);
        chain.reject_credit("0xdead", ChainError::TxFailed);
        chain.reject_credit("0xpending", ChainError::TxUnconfirmed);
        let (service, _dir) = service_with(chain);

        for (signature, expect_reason) in [
            ("0xmissing", "not found"),
            ("0xother", "recipient"),
            ("0xdead", "failed"),
            ("0xpending", "confirmed"),
        ] {
            let err = service.deposit_notify(signature).await.unwrap_err();
            match err {
                LedgerError::CreditRejected(reason) => {
                    assert!(
                        reason.to_string().to_lowercase().contains(expect_reason),
                        "{signature}: unexpected reason {reason}"
                    );
                }
                other => panic!("{signature}: expected rejection, got {other:?}"),
            }
        }

        assert!(matches!(
            service.deposit_notify("").await.unwrap_err(),
            LedgerError::MissingSignature
        ));
        assert_eq!(service.tracked_state().vault_balance, 0.0);
    }

    #[tokio::test]
    async fn cycle_moves_reward_and_conserves_value() {
        let chain = Arc::new(MockChain::new(10.0));
        chain.add_credit("0xfund", custody_address(), 0.01);
        let (service, _dir) = service_with(chain);
        service.deposit_notify("0xfund").await.unwrap();

        let before = service.tracked_state();
        let outcome = service.complete_cycle().await.unwrap();

        assert_eq!(outcome.reward_paid, 0.001);
        assert!(!outcome.partial);
        assert_eq!(outcome.completed_cycles, 1);

        let after = service.tracked_state();
        assert!((after.total() - before.total()).abs() < BALANCE_EPSILON);
        assert!((after.vault_balance - 0.009).abs() < BALANCE_EPSILON);
        assert!((after.earned_balance - 0.001).abs() < BALANCE_EPSILON);
    }

    #[tokio::test]
    async fn partial_cycle_drains_the_vault() {
        let chain = Arc::new(MockChain::new(10.0));
        let (service, _dir) = service_with(chain);
        service
            .admin_override(StateOverride {
                vault_balance: Some(0.0005),
                ..StateOverride::default()
            })
            .await
            .unwrap();

        let outcome = service.complete_cycle().await.unwrap();
        assert_eq!(outcome.reward_paid, 0.0005);
        assert!(outcome.partial);
        assert_eq!(outcome.vault_balance, 0.0);
    }

    #[tokio::test]
    async fn cycle_fails_on_empty_vault() {
        let chain = Arc::new(MockChain::new(10.0));
        let (service, _dir) = service_with(chain);

        let err = service.complete_cycle().await.unwrap_err();
        assert!(matches!(err, LedgerError::VaultEmpty));
        assert_eq!(service.tracked_state().completed_cycles, 0);
    }

    #[tokio::test]
    async fn withdraw_deducts_and_submits() {
        let chain = Arc::new(MockChain::new(10.0));
        let (service, _dir) = service_with(Arc::clone(&chain));
        seed_earned(&service, 0.5).await;

        let outcome = service.withdraw(DEST, 0.2).await.unwrap();
        assert!((outcome.earned_balance - 0.3).abs() < BALANCE_EPSILON);

        let sent = chain.sent_transfers();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, DEST.parse::<Address>().unwrap());
        assert_eq!(sent[0].1, to_wei(0.2));
    }

    #[tokio::test]
    async fn withdraw_validation_happens_before_any_state_access() {
        let chain = Arc::new(MockChain::new(10.0));
        let (service, _dir) = service_with(Arc::clone(&chain));
        seed_earned(&service, 0.5).await;

        assert!(matches!(
            service.withdraw("not-an-address", 0.1).await.unwrap_err(),
            LedgerError::InvalidAddress
        ));
        assert!(matches!(
            service.withdraw(DEST, 0.0).await.unwrap_err(),
            LedgerError::NonPositiveAmount
        ));
        assert!(matches!(
            service.withdraw(DEST, -1.0).await.unwrap_err(),
            LedgerError::NonPositiveAmount
        ));
        assert!(chain.sent_transfers().is_empty());
    }

    #[tokio::test]
    async fn withdraw_reports_insufficient_earned_balance() {
        let chain = Arc::new(MockChain::new(10.0));
        let (service, _dir) = service_with(chain);
        seed_earned(&service, 0.1).await;

        match service.withdraw(DEST, 0.5).await.unwrap_err() {
            LedgerError::InsufficientEarned { available } => assert_eq!(available, 0.1),
            other => panic!("expected InsufficientEarned, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn withdraw_requires_on_chain_room_for_fees() {
        // Earned says 0.5 but the chain only holds 0.2: the fee reserve must
        // block a 0.2 withdrawal.
        let chain = Arc::new(MockChain::new(0.2));
        let (service, _dir) = service_with(Arc::clone(&chain));
        seed_earned(&service, 0.5).await;

        let err = service.withdraw(DEST, 0.2).await.unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientChainBalance { .. }));
        assert!(chain.sent_transfers().is_empty());
        // The deduction never happened.
        assert_eq!(service.tracked_state().earned_balance, 0.5);
    }

    #[tokio::test]
    async fn failed_transfer_rolls_back_the_deduction() {
        let chain = Arc::new(MockChain::new(10.0));
        chain.fail_next_transfer(ChainError::TransferRejected("node rejected".into()));
        let (service, _dir) = service_with(chain);
        seed_earned(&service, 0.5).await;

        let err = service.withdraw(DEST, 0.2).await.unwrap_err();
        match err {
            LedgerError::TransferFailed { earned_balance, .. } => {
                assert_eq!(earned_balance, 0.5);
            }
            other => panic!("expected TransferFailed, got {other:?}"),
        }
        // Net zero effect, in memory and on disk.
        assert_eq!(service.tracked_state().earned_balance, 0.5);
    }

    #[tokio::test]
    async fn concurrent_withdrawals_cannot_double_spend() {
        let chain = Arc::new(MockChain::new(10.0));
        chain.set_transfer_delay(Duration::from_millis(20));
        let (service, _dir) = service_with(Arc::clone(&chain));
        seed_earned(&service, 0.3).await;

        // Combined 0.6 > 0.3 earned: exactly one may succeed.
        let (a, b) = tokio::join!(
            {
                let service = Arc::clone(&service);
                async move { service.withdraw(DEST, 0.3).await }
            },
            {
                let service = Arc::clone(&service);
                async move { service.withdraw(DEST, 0.3).await }
            }
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert_eq!(chain.sent_transfers().len(), 1);
        assert!(service.tracked_state().earned_balance >= 0.0);
    }

    #[tokio::test]
    async fn migrate_adopts_chain_balance_once() {
        let chain = Arc::new(MockChain::new(5.0));
        let (service, _dir) = service_with(chain);

        let outcome = service.migrate().await.unwrap();
        assert_eq!(outcome.migrated_amount, 5.0);
        assert_eq!(service.tracked_state().vault_balance, 5.0);

        let err = service.migrate().await.unwrap_err();
        match err {
            LedgerError::MigrationNotNeeded { tracked } => assert_eq!(tracked, 5.0),
            other => panic!("expected MigrationNotNeeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn admin_override_clamps_and_reports_snapshot() {
        let chain = Arc::new(MockChain::new(10.0));
        let (service, _dir) = service_with(chain);

        let outcome = service
            .admin_override(StateOverride {
                vault_balance: Some(-3.0),
                earned_balance: Some(1.5),
                reward_per_cycle: Some(0.002),
                completed_cycles: Some(9),
            })
            .await
            .unwrap();

        assert_eq!(outcome.before, LedgerState::new(0.001));
        assert_eq!(outcome.after.vault_balance, 0.0);
        assert_eq!(outcome.after.earned_balance, 1.5);
        assert_eq!(outcome.after.reward_per_cycle, 0.002);
        assert_eq!(outcome.after.completed_cycles, 9);
    }

    #[tokio::test]
    async fn admin_override_ignores_non_finite_values() {
        let chain = Arc::new(MockChain::new(10.0));
        let (service, _dir) = service_with(chain);
        seed_earned(&service, 1.0).await;

        let outcome = service
            .admin_override(StateOverride {
                earned_balance: Some(f64::NAN),
                ..StateOverride::default()
            })
            .await
            .unwrap();
        assert_eq!(outcome.after.earned_balance, 1.0);
    }

    #[tokio::test]
    async fn reward_config_rejects_negative_values() {
        let chain = Arc::new(MockChain::new(10.0));
        let (service, _dir) = service_with(chain);

        assert!(matches!(
            service.set_reward_per_cycle(-0.001).await.unwrap_err(),
            LedgerError::NegativeReward
        ));

        service.set_reward_per_cycle(0.005).await.unwrap();
        assert_eq!(service.reward_per_cycle(), 0.005);
    }

    #[tokio::test]
    async fn status_reports_discrepancy_and_never_mutates() {
        let chain = Arc::new(MockChain::new(2.0));
        let (service, _dir) = service_with(chain);
        seed_earned(&service, 0.5).await;

        let before = service.tracked_state();
        for _ in 0..3 {
            let report = service.status().await.unwrap();
            assert_eq!(report.on_chain_balance, 2.0);
            assert!((report.total_tracked - 0.5).abs() < BALANCE_EPSILON);
            assert!((report.discrepancy - 1.5).abs() < BALANCE_EPSILON);
        }
        assert_eq!(service.tracked_state(), before);
    }

    #[tokio::test]
    async fn vault_info_exposes_address_and_balance() {
        let chain = Arc::new(MockChain::new(3.0));
        let (service, _dir) = service_with(chain);

        let info = service.vault_info().await.unwrap();
        assert_eq!(info.address, custody_address().to_string());
        assert_eq!(info.on_chain_balance, 3.0);
    }

    #[tokio::test]
    async fn mutations_survive_reload_from_store() {
        let chain = Arc::new(MockChain::new(10.0));
        chain.add_credit("0xfund", custody_address(), 0.01);
        let dir = TempDir::new().unwrap();
        let store = LedgerStore::new(&StoragePaths::new(dir.path()));

        let service = LedgerService::new(
            custody_address(),
            Arc::clone(&chain) as Arc<dyn ChainGateway>,
            store.clone(),
            LedgerState::new(0.001),
            0.001,
        );
        service.deposit_notify("0xfund").await.unwrap();
        service.complete_cycle().await.unwrap();
        let final_state = service.tracked_state();

        let reloaded = store.load_or(LedgerState::default()).unwrap();
        assert_eq!(reloaded, final_state);
    }
}
