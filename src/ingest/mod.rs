// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod scheduler;
pub mod types;

use crate::ingest::types::Timestamped;
use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_cycles_total", "Fetch/filter/persist cycles started.");
        describe_counter!("ingest_fetch_errors_total", "Feed fetch/parse errors.");
        describe_counter!("ingest_persist_errors_total", "Store append errors.");
        describe_counter!(
            "ingest_persisted_total",
            "Actions appended to the store."
        );
        describe_counter!(
            "ingest_stale_total",
            "Fetched actions at or below the watermark."
        );
        describe_gauge!(
            "ingest_watermark_ts",
            "Unix ts of the newest action confirmed in the store."
        );
        describe_gauge!(
            "ingest_consecutive_failures",
            "Cycles failed in a row since the last successful one."
        );
        describe_histogram!("feed_fetch_ms", "Feed fetch time in milliseconds.");
    });
}

/// Split a fetched batch into the items strictly newer than `watermark`
/// (in feed order) and the watermark to commit once they are stored.
///
/// The candidate is the max over *all* items, never below `watermark`.
pub fn filter_new<T: Timestamped>(batch: Vec<T>, watermark: i64) -> (Vec<T>, i64) {
    let mut candidate = watermark;
    let mut fresh = Vec::with_capacity(batch.len());
    for item in batch {
        let ts = item.time_seconds();
        candidate = candidate.max(ts);
        if ts > watermark {
            fresh.push(item);
        }
    }
    (fresh, candidate)
}
