// src/ingest/types.rs
use serde::{Deserialize, Serialize};

/// A blog entry as returned by the Codeforces API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlogEntry {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_locale: Option<String>,
    pub creation_time_seconds: i64,
    #[serde(default)]
    pub author_handle: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_time_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_view_history: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
}

/// A comment under a blog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub creation_time_seconds: i64,
    #[serde(default)]
    pub commentator_handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
}

/// One entry of the `recentActions` feed.
///
/// Only `time_seconds` matters for ingestion; the blog entry and comment are
/// carried through to the store untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecentAction {
    pub time_seconds: i64, // unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_entry: Option<BlogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,
}

impl RecentAction {
    /// Bare action with no payload, stamped at `time_seconds`.
    pub fn at(time_seconds: i64) -> Self {
        Self {
            time_seconds,
            ..Self::default()
        }
    }
}

/// Anything carrying a seconds-resolution creation timestamp.
pub trait Timestamped {
    fn time_seconds(&self) -> i64;
}

impl Timestamped for RecentAction {
    fn time_seconds(&self) -> i64 {
        self.time_seconds
    }
}

/// Failure modes of a feed fetch.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("could not create request for /recentActions: {0}")]
    RequestConstruction(#[source] reqwest::Error),
    #[error("http call to /recentActions failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("could not parse /recentActions response: {0}")]
    ResponseParse(#[from] serde_json::Error),
    #[error("codeforces returned an error status with comment [{comment}]")]
    RemoteStatus { comment: String },
}

#[async_trait::async_trait]
pub trait FeedClient: Send + Sync {
    /// Fetch up to `max_count` most recent actions, in feed order.
    async fn fetch_recent(&self, max_count: usize) -> Result<Vec<RecentAction>, FeedError>;
    fn name(&self) -> &'static str;
}
