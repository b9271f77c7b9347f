// src/ingest/providers/codeforces.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::types::{FeedClient, FeedError, RecentAction};

pub const DEFAULT_BASE_URL: &str = "https://codeforces.com/api";
const RECENT_ACTIONS_ENDPOINT: &str = "/recentActions";
const STATUS_OK: &str = "OK";

/// Every Codeforces API response is wrapped like this; errors come back as
/// `status: "FAILED"` plus a human readable `comment`.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    result: Vec<RecentAction>,
}

/// Client for the Codeforces `recentActions` endpoint.
///
/// Holds one `reqwest::Client` (and its connection pool) for the life of the
/// process.
pub struct CodeforcesClient {
    base_url: String,
    client: reqwest::Client,
}

impl CodeforcesClient {
    /// Build a client with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building codeforces http client")?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, client })
    }

    fn parse_envelope(body: &[u8]) -> Result<Vec<RecentAction>, FeedError> {
        let envelope: Envelope = serde_json::from_slice(body).map_err(|e| {
            tracing::debug!(target: "feed", body = %String::from_utf8_lossy(body), "unparsable body");
            FeedError::ResponseParse(e)
        })?;

        if envelope.status != STATUS_OK {
            tracing::debug!(target: "feed", status = %envelope.status, "non-OK envelope");
            return Err(FeedError::RemoteStatus {
                comment: envelope.comment.unwrap_or_default(),
            });
        }
        Ok(envelope.result)
    }
}

#[async_trait]
impl FeedClient for CodeforcesClient {
    async fn fetch_recent(&self, max_count: usize) -> Result<Vec<RecentAction>, FeedError> {
        tracing::info!(target: "feed", max_count, "executing recentActions");
        let t0 = std::time::Instant::now();

        let url = format!("{}{}", self.base_url, RECENT_ACTIONS_ENDPOINT);
        let req = self
            .client
            .get(&url)
            .query(&[("maxCount", max_count)])
            .build()
            .map_err(|e| {
                tracing::debug!(target: "feed", url = %url, "request build failed");
                FeedError::RequestConstruction(e)
            })?;

        // The API reports failures inside the envelope, often with a 4xx
        // status, so the HTTP status code is not checked here.
        let resp = self
            .client
            .execute(req)
            .await
            .map_err(FeedError::Transport)?;
        let body = resp.bytes().await.map_err(FeedError::Transport)?;
        let actions = Self::parse_envelope(&body)?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("feed_fetch_ms").record(ms);
        tracing::debug!(target: "feed", fetched = actions.len(), ms, "recentActions done");
        Ok(actions)
    }

    fn name(&self) -> &'static str {
        "codeforces"
    }
}
