// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Probe Dispatcher
 * Sends mutant batches under a bounded concurrency window and feeds every
 * completed outcome to the analyzer, isolating per-probe failures
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use futures::future;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::TransportError;
use crate::types::{Mutant, ProbeOutcome};

/// Advisory accounting for one dispatch call. Failed probes never block a
/// scan, but operators need the numbers to judge result completeness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    /// Mutants handed to the dispatcher
    pub total: usize,
    /// Outcomes actually delivered to the analyzer (lower than total only
    /// after an early stop)
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Shared stop signal. Stopping halts the scheduling of new sends;
/// in-flight sends drain and their outcomes are still delivered.
#[derive(Clone, Default)]
pub struct DispatchHandle {
    stop: Arc<AtomicBool>,
}

impl DispatchHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

/// Bounded-concurrency probe executor. Holds no per-scan state; one
/// instance can serve many dispatch calls.
#[derive(Debug, Clone)]
pub struct ProbeDispatcher {
    concurrency_limit: usize,
    probe_timeout: Option<Duration>,
}

impl ProbeDispatcher {
    pub fn new(concurrency_limit: usize) -> Self {
        Self {
            concurrency_limit: concurrency_limit.max(1),
            probe_timeout: None,
        }
    }

    /// Guard each send with a deadline; an elapsed deadline becomes a
    /// timeout outcome, never an unwinding error
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Send every mutant, at most `concurrency_limit` in flight at once,
    /// and invoke `analyze` exactly once per completed probe. Completion
    /// order across mutants is unspecified; within one mutant, send then
    /// analyze are strictly sequential. Returns only after every scheduled
    /// mutant has produced exactly one outcome.
    pub async fn dispatch<S, Fut, A>(&self, mutants: Vec<Mutant>, send: S, analyze: A) -> DispatchSummary
    where
        S: Fn(Mutant) -> Fut + Send + Sync,
        Fut: Future<Output = ProbeOutcome> + Send,
        A: Fn(ProbeOutcome, &DispatchHandle) + Send + Sync,
    {
        let total = mutants.len();
        debug!(
            "Dispatching {} mutants with concurrency limit {}",
            total, self.concurrency_limit
        );

        let handle = DispatchHandle::new();
        let dispatched = AtomicUsize::new(0);
        let succeeded = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        let send_ref = &send;
        let analyze_ref = &analyze;
        let handle_ref = &handle;
        let dispatched_ref = &dispatched;
        let succeeded_ref = &succeeded;
        let failed_ref = &failed;
        let probe_timeout = self.probe_timeout;

        stream::iter(mutants)
            .take_while(move |_| future::ready(!handle_ref.is_stopped()))
            .for_each_concurrent(self.concurrency_limit, move |mutant| async move {
                let outcome = probe(probe_timeout, mutant, send_ref).await;

                dispatched_ref.fetch_add(1, Ordering::Relaxed);
                if outcome.is_success() {
                    succeeded_ref.fetch_add(1, Ordering::Relaxed);
                } else {
                    failed_ref.fetch_add(1, Ordering::Relaxed);
                }

                // Same worker slot, strictly after the send completes
                analyze_ref(outcome, handle_ref);
            })
            .await;

        let summary = DispatchSummary {
            total,
            dispatched: dispatched.load(Ordering::Relaxed),
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
        };

        if summary.failed > 0 {
            warn!(
                "Dispatch finished with {}/{} failed probes",
                summary.failed, summary.dispatched
            );
        }
        summary
    }
}

async fn probe<S, Fut>(timeout: Option<Duration>, mutant: Mutant, send: &S) -> ProbeOutcome
where
    S: Fn(Mutant) -> Fut,
    Fut: Future<Output = ProbeOutcome>,
{
    match timeout {
        Some(deadline) => {
            let fallback = mutant.clone();
            match tokio::time::timeout(deadline, send(mutant)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    let url = fallback.mutated_url().to_string();
                    ProbeOutcome::failure(
                        fallback,
                        TransportError::ConnectionTimeout {
                            url,
                            timeout: deadline,
                        },
                    )
                }
            }
        }
        None => send(mutant).await,
    }
}
