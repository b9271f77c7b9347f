// src/ingest/scheduler.rs
//! The polling loop: fetch recent actions, keep the ones newer than the
//! watermark, append them, and only then move the watermark forward.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use metrics::{counter, gauge};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::ingest::types::{FeedClient, FeedError};
use crate::ingest::{ensure_metrics_described, filter_new};
use crate::store::ActionStore;

#[derive(Clone, Copy, Debug)]
pub struct SchedulerCfg {
    pub batch_size: usize,
    pub cooldown: Duration,
}

/// What a single fetch/filter/persist pass ended with.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Feed call failed; nothing was filtered or stored.
    FetchFailed(FeedError),
    /// Store rejected the batch; watermark left where it was.
    PersistFailed(anyhow::Error),
    /// Every fetched action was at or below the watermark.
    UpToDate { watermark: i64 },
    Persisted { inserted: usize, watermark: i64 },
}

impl CycleOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::FetchFailed(_) | Self::PersistFailed(_))
    }
}

pub struct Scheduler {
    feed: Arc<dyn FeedClient>,
    store: Arc<dyn ActionStore>,
    cfg: SchedulerCfg,
    // Everything with time_seconds <= watermark is already in the store.
    watermark: i64,
    consecutive_failures: u64,
}

impl Scheduler {
    /// Build a scheduler with an explicit starting watermark.
    pub fn new(
        feed: Arc<dyn FeedClient>,
        store: Arc<dyn ActionStore>,
        cfg: SchedulerCfg,
        watermark: i64,
    ) -> Self {
        Self {
            feed,
            store,
            cfg,
            watermark,
            consecutive_failures: 0,
        }
    }

    /// Build a scheduler that picks up where the store left off.
    ///
    /// If the store cannot report its newest timestamp the watermark starts
    /// at 0 and the error is logged.
    pub async fn resume(
        feed: Arc<dyn FeedClient>,
        store: Arc<dyn ActionStore>,
        cfg: SchedulerCfg,
    ) -> Self {
        let watermark = match store.max_stored_timestamp().await {
            Ok(ts) => ts,
            Err(e) => {
                error!(target: "ingest", error = ?e, store = store.name(), "querying max stored timestamp failed, starting from 0");
                0
            }
        };
        ensure_metrics_described();
        gauge!("ingest_watermark_ts").set(watermark as f64);
        info!(target: "ingest", watermark, at = %display_ts(watermark), "resuming from store");
        Self::new(feed, store, cfg, watermark)
    }

    pub fn watermark(&self) -> i64 {
        self.watermark
    }

    pub fn consecutive_failures(&self) -> u64 {
        self.consecutive_failures
    }

    /// Run one fetch/filter/persist pass. Never sleeps.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let outcome = self.cycle().await;
        self.consecutive_failures = if outcome.is_failure() {
            self.consecutive_failures + 1
        } else {
            0
        };
        gauge!("ingest_consecutive_failures").set(self.consecutive_failures as f64);
        outcome
    }

    async fn cycle(&mut self) -> CycleOutcome {
        ensure_metrics_described();
        counter!("ingest_cycles_total").increment(1);

        let batch = match self.feed.fetch_recent(self.cfg.batch_size).await {
            Ok(batch) => batch,
            Err(e) => {
                counter!("ingest_fetch_errors_total").increment(1);
                error!(target: "ingest", error = %e, feed = self.feed.name(), "recent actions query failed");
                return CycleOutcome::FetchFailed(e);
            }
        };

        let fetched = batch.len();
        let (fresh, candidate) = filter_new(batch, self.watermark);
        counter!("ingest_stale_total").increment((fetched - fresh.len()) as u64);
        debug!(target: "ingest", fetched, fresh = fresh.len(), candidate, "filtered batch");

        if fresh.is_empty() {
            // candidate == watermark here, there is nothing to confirm
            info!(target: "ingest", watermark = self.watermark, "no new actions");
            return CycleOutcome::UpToDate {
                watermark: self.watermark,
            };
        }

        if let Err(e) = self.store.append(&fresh).await {
            counter!("ingest_persist_errors_total").increment(1);
            error!(target: "ingest", error = ?e, store = self.store.name(), "store insertion failed");
            return CycleOutcome::PersistFailed(e);
        }

        // Commit only after the store confirmed the append.
        self.watermark = self.watermark.max(candidate);
        counter!("ingest_persisted_total").increment(fresh.len() as u64);
        gauge!("ingest_watermark_ts").set(self.watermark as f64);
        info!(
            target: "ingest",
            inserted = fresh.len(),
            watermark = self.watermark,
            at = %display_ts(self.watermark),
            "persisted activities till timestamp"
        );

        CycleOutcome::Persisted {
            inserted: fresh.len(),
            watermark: self.watermark,
        }
    }

    /// Loop until `cancel` fires: cycle, then cool down for the configured
    /// duration regardless of the outcome. Returns the final watermark.
    ///
    /// Cancellation is checked before every fetch and interrupts the cooldown.
    pub async fn run(mut self, cancel: CancellationToken) -> i64 {
        info!(
            target: "ingest",
            batch_size = self.cfg.batch_size,
            cooldown_secs = self.cfg.cooldown.as_secs(),
            watermark = self.watermark,
            "scheduler started"
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }

            // A panicking collaborator must not take the loop down with it.
            if AssertUnwindSafe(self.run_cycle())
                .catch_unwind()
                .await
                .is_err()
            {
                error!(target: "ingest", "cycle panicked, watermark unchanged");
                self.consecutive_failures += 1;
            }

            debug!(target: "ingest", cooldown = ?self.cfg.cooldown, "sleeping");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.cfg.cooldown) => {}
            }
        }

        info!(target: "ingest", watermark = self.watermark, "scheduler stopped");
        self.watermark
    }

    /// Spawn [`run`](Self::run) on the tokio runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<i64> {
        tokio::spawn(self.run(cancel))
    }
}

fn display_ts(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}
