//! Rate-limited outbound work queue.
//!
//! # Responsibilities
//! - Run callbacks immediately while capacity remains in the current window
//! - Defer the rest, preserving FIFO order
//! - Refill capacity on every interval tick and drain the deferred callbacks
//!
//! # Design Decisions
//! - One queue per process: the limit mirrors the chat connection's limit
//! - Nothing is dropped; excess callbacks wait for the next window
//! - Callbacks run outside the lock, so a callback may enqueue more work
//! - While a tick drains, new callbacks are queued behind the drained batch
//! - A panicking callback is logged and skipped

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant};

use crate::config::{Environment, QueueConfig};
use crate::observability::metrics;

/// Deferred zero-argument callback.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    remaining: usize,
    pending: VecDeque<Job>,
}

/// Outbound queue with a fixed capacity per interval.
pub struct OutboundQueue {
    limit: usize,
    interval: Duration,
    state: Mutex<QueueState>,
}

impl OutboundQueue {
    /// Create a queue allowing `limit_per_interval` callbacks per `reset_interval`.
    pub fn new(limit_per_interval: usize, reset_interval: Duration) -> Self {
        Self {
            limit: limit_per_interval,
            interval: reset_interval,
            state: Mutex::new(QueueState {
                remaining: limit_per_interval,
                pending: VecDeque::new(),
            }),
        }
    }

    pub fn from_config(config: &QueueConfig, environment: Environment) -> Self {
        Self::new(
            config.effective_limit(environment),
            Duration::from_millis(config.reset_interval_ms),
        )
    }

    /// Run `job` now if capacity remains, otherwise defer it.
    pub fn add<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let job: Job = Box::new(job);
        let run_now = {
            let mut state = self.state.lock().expect("outbound queue mutex poisoned");
            if state.remaining > 0 && state.pending.is_empty() {
                state.remaining -= 1;
                Some(job)
            } else {
                state.pending.push_back(job);
                metrics::record_queue_pending(state.pending.len());
                tracing::trace!(pending = state.pending.len(), "Outbound capacity exhausted, deferring");
                None
            }
        };

        if let Some(job) = run_now {
            execute(job);
        }
    }

    /// Refill capacity and drain deferred callbacks while capacity allows.
    pub fn tick(&self) {
        let mut budget = self.limit;
        loop {
            let batch: Vec<Job> = {
                let mut state = self.state.lock().expect("outbound queue mutex poisoned");
                let take = budget.min(state.pending.len());
                budget -= take;
                let batch: Vec<Job> = state.pending.drain(..take).collect();
                // Hold capacity at zero while the batch runs so concurrent
                // adds line up behind it.
                state.remaining = if batch.is_empty() { budget } else { 0 };
                metrics::record_queue_pending(state.pending.len());
                batch
            };

            if batch.is_empty() {
                return;
            }

            tracing::trace!(count = batch.len(), "Draining deferred outbound callbacks");
            for job in batch {
                execute(job);
            }
        }
    }

    /// Tick every interval until shutdown.
    ///
    /// The first tick happens one full interval after start.
    pub async fn run(self: std::sync::Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            limit = self.limit,
            interval_ms = self.interval.as_millis() as u64,
            "Outbound queue starting"
        );

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();
                }
                _ = shutdown.recv() => {
                    tracing::info!(pending = self.pending(), "Outbound queue received shutdown signal");
                    break;
                }
            }
        }
    }

    /// Capacity left in the current window.
    pub fn remaining(&self) -> usize {
        self.state.lock().expect("outbound queue mutex poisoned").remaining
    }

    /// Number of deferred callbacks.
    pub fn pending(&self) -> usize {
        self.state.lock().expect("outbound queue mutex poisoned").pending.len()
    }
}

fn execute(job: Job) {
    if catch_unwind(AssertUnwindSafe(job)).is_err() {
        tracing::error!("Outbound callback panicked");
        metrics::record_outbound_failure();
    }
}
