// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod cli;
pub mod ingest;
pub mod store;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::ingest::filter_new;
pub use crate::ingest::scheduler::{CycleOutcome, Scheduler, SchedulerCfg};
pub use crate::ingest::types::{FeedClient, FeedError, RecentAction, Timestamped};
pub use crate::store::{ActionStore, MemoryStore, MongoStore};
