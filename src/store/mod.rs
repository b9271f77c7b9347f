// src/store/mod.rs
pub mod memory;
pub mod mongo;

use anyhow::Result;

use crate::ingest::types::RecentAction;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[async_trait::async_trait]
pub trait ActionStore: Send + Sync {
    /// Append all `actions` in order. An empty slice is a successful no-op.
    async fn append(&self, actions: &[RecentAction]) -> Result<()>;

    /// All stored actions with `time_seconds >= timestamp`.
    async fn query_after(&self, timestamp: i64) -> Result<Vec<RecentAction>>;

    /// Newest stored `time_seconds`, or 0 when the store is empty.
    async fn max_stored_timestamp(&self) -> Result<i64>;

    fn name(&self) -> &'static str;
}
