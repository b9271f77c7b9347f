// src/store/memory.rs
use anyhow::Result;
use std::sync::Mutex;

use super::ActionStore;
use crate::ingest::types::RecentAction;

/// In-process store. Used for dry runs and as the store double in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Vec<RecentAction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-populated store (e.g. to simulate a restart).
    pub fn with_actions(actions: Vec<RecentAction>) -> Self {
        Self {
            inner: Mutex::new(actions),
        }
    }

    pub fn snapshot(&self) -> Vec<RecentAction> {
        self.inner.lock().expect("memory store mutex poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("memory store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl ActionStore for MemoryStore {
    async fn append(&self, actions: &[RecentAction]) -> Result<()> {
        if actions.is_empty() {
            return Ok(());
        }
        tracing::info!(target: "store", count = actions.len(), "persisting batch in memory");
        self.inner
            .lock()
            .expect("memory store mutex poisoned")
            .extend_from_slice(actions);
        Ok(())
    }

    async fn query_after(&self, timestamp: i64) -> Result<Vec<RecentAction>> {
        let v = self.inner.lock().expect("memory store mutex poisoned");
        Ok(v.iter()
            .filter(|a| a.time_seconds >= timestamp)
            .cloned()
            .collect())
    }

    async fn max_stored_timestamp(&self) -> Result<i64> {
        let v = self.inner.lock().expect("memory store mutex poisoned");
        Ok(v.iter().map(|a| a.time_seconds).max().unwrap_or(0))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_store_reports_zero() {
        let store = MemoryStore::new();
        assert_eq!(store.max_stored_timestamp().await.unwrap(), 0);
        store.append(&[]).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn query_after_is_inclusive_floor() {
        let store = MemoryStore::with_actions(vec![
            RecentAction::at(10),
            RecentAction::at(20),
            RecentAction::at(30),
        ]);
        let got: Vec<i64> = store
            .query_after(20)
            .await
            .unwrap()
            .iter()
            .map(|a| a.time_seconds)
            .collect();
        assert_eq!(got, vec![20, 30]);
        assert_eq!(store.max_stored_timestamp().await.unwrap(), 30);
    }
}
