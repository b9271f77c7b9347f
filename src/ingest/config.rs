// src/ingest/config.rs
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ingest::providers::codeforces::DEFAULT_BASE_URL;
use crate::ingest::scheduler::SchedulerCfg;

const ENV_PATH: &str = "INGEST_CONFIG_PATH";
const DEFAULT_TOML_PATH: &str = "config/ingest.toml";
const DEFAULT_JSON_PATH: &str = "config/ingest.json";

pub const DEFAULT_COOLDOWN_MINUTES: u64 = 5;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_DATABASE_NAME: &str = "cfrss-local";
pub const DEFAULT_MONGO_ADDR: &str = "mongodb://localhost:27017";
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 120;

/// Deployment environment; only affects log format and verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

/// Backing store for ingested actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Mongo,
    /// In-process store, lost on exit. Handy for dry runs.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub environment: Environment,
    pub store: StoreKind,
    pub mongo_addr: String,
    pub database_name: String,
    pub cooldown_minutes: u64,
    pub batch_size: usize,
    pub feed_timeout_secs: u64,
    pub feed_base_url: String,
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Dev,
            store: StoreKind::Mongo,
            mongo_addr: DEFAULT_MONGO_ADDR.to_string(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            cooldown_minutes: DEFAULT_COOLDOWN_MINUTES,
            batch_size: DEFAULT_BATCH_SIZE,
            feed_timeout_secs: DEFAULT_FEED_TIMEOUT_SECS,
            feed_base_url: DEFAULT_BASE_URL.to_string(),
            metrics_addr: None,
        }
    }
}

impl IngestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.cooldown_minutes == 0 {
            bail!("cooldown_minutes must be positive");
        }
        if self.cooldown_minutes.checked_mul(60).is_none() {
            bail!("cooldown_minutes {} is too large", self.cooldown_minutes);
        }
        if self.feed_timeout_secs == 0 {
            bail!("feed_timeout_secs must be positive");
        }
        if self.store == StoreKind::Mongo && self.database_name.trim().is_empty() {
            bail!("database_name must not be empty");
        }
        Ok(())
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_minutes.saturating_mul(60))
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    pub fn scheduler_cfg(&self) -> SchedulerCfg {
        SchedulerCfg {
            batch_size: self.batch_size,
            cooldown: self.cooldown(),
        }
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_config_from(path: &Path) -> Result<IngestConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading ingest config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing ingest config {}", path.display()))
}

/// Load config from `$INGEST_CONFIG_PATH` if set (it must exist), else the
/// first of `config/ingest.toml`, `config/ingest.json` that exists, else
/// built-in defaults.
pub fn load_config_default() -> Result<IngestConfig> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let path = PathBuf::from(&p);
        if !path.exists() {
            bail!("{ENV_PATH} points to non-existent path {p}");
        }
        return load_config_from(&path);
    }
    match [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH]
        .into_iter()
        .map(Path::new)
        .find(|p| p.exists())
    {
        Some(path) => load_config_from(path),
        None => Ok(IngestConfig::default()),
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<IngestConfig> {
    match hint_ext {
        "json" => Ok(serde_json::from_str(s)?),
        "toml" => Ok(toml::from_str(s)?),
        // No usable extension: JSON starts with a brace, TOML never does.
        _ if s.trim_start().starts_with('{') => Ok(serde_json::from_str(s)?),
        _ => Ok(toml::from_str(s)?),
    }
}
