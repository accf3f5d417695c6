// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bounded worker pool for fan-out stages
//!
//! Every item becomes one task in a [`JoinSet`]; a semaphore caps how many run
//! at once. Each task sends exactly one `(index, output)` message. The results
//! are read only after every task has resolved, so the caller sees a settled
//! set. Dropping the returned future aborts all outstanding tasks.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Create a pool running at most `workers` units concurrently (minimum 1)
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `task` for every item and wait for all of them.
    ///
    /// The output vector is in input order. A slot is `None` when its unit
    /// panicked or was aborted before reporting.
    pub async fn run<I, T, F, Fut>(&self, items: Vec<I>, task: F) -> Vec<Option<T>>
    where
        I: Send + 'static,
        T: Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let total = items.len();
        if total == 0 {
            return Vec::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let task = Arc::new(task);
        // One message per unit, so sends never wait on capacity
        let (tx, mut rx) = mpsc::channel::<(usize, T)>(total);
        let mut units = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let task = Arc::clone(&task);
            let tx = tx.clone();
            units.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                let output = task(item).await;
                let _ = tx.send((index, output)).await;
            });
        }
        drop(tx);

        // Join barrier
        while let Some(joined) = units.join_next().await {
            if let Err(e) = joined {
                warn!("Worker unit did not complete: {}", e);
            }
        }

        let mut results: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();
        while let Ok((index, output)) = rx.try_recv() {
            results[index] = Some(output);
        }
        results
    }
}
