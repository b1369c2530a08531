// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! FIFO serialization of ledger mutations.
//!
//! Every mutating operation is a read-modify-write over the single ledger
//! record, with awaits on the chain in the middle. If two operations
//! interleaved, both could observe the same pre-mutation balance and both
//! authorize a withdrawal. The sequencer closes that window: operations begin
//! their critical sections strictly in enqueue order and at most one body
//! runs at a time, across all of its await points.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// FIFO critical sections over an exclusively-owned state value.
///
/// Built on `tokio::sync::Mutex`, whose waiter queue is fair: lock
/// acquisitions resolve in request order, so enqueue order is execution
/// order. One operation failing has no effect on the operations queued
/// behind it.
pub struct MutationSequencer<S> {
    slot: Arc<Mutex<S>>,
}

impl<S: Send + 'static> MutationSequencer<S> {
    pub fn new(state: S) -> Self {
        Self {
            slot: Arc::new(Mutex::new(state)),
        }
    }

    /// Enqueue a mutating operation and wait for its result.
    ///
    /// The operation receives the owned guard for the sequenced state and
    /// runs to completion once started: the body is driven by a spawned task,
    /// so a caller that is cancelled mid-await (a dropped HTTP connection)
    /// cannot abandon a mutation halfway through its critical section.
    pub async fn enqueue<T, F, Fut>(&self, op: F) -> T
    where
        T: Send + 'static,
        F: FnOnce(OwnedMutexGuard<S>) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let slot = Arc::clone(&self.slot);
        let task = tokio::spawn(async move {
            let guard = slot.lock_owned().await;
            op(guard).await
        });

        match task.await {
            Ok(value) => value,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            // The task is never aborted; reaching this means the runtime is
            // tearing down underneath us.
            Err(e) => panic!("sequenced operation vanished: {e}"),
        }
    }
}
