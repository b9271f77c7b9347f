// src/cli.rs
use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::ingest::config::{
    load_config_default, load_config_from, Environment, IngestConfig, StoreKind,
};

/// Poll Codeforces recent actions and append new ones to MongoDB.
///
/// Flags and their env vars override the config file, which overrides the
/// built-in defaults.
#[derive(Debug, Default, Parser)]
#[command(name = "recent-actions-ingest", version, about)]
pub struct Cli {
    /// TOML or JSON config file (default: $INGEST_CONFIG_PATH, then config/ingest.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// The current environment: dev/prod
    #[arg(long, env = "INGEST_ENVIRONMENT", value_enum)]
    pub environment: Option<Environment>,

    #[arg(long, env = "INGEST_STORE", value_enum)]
    pub store: Option<StoreKind>,

    /// MongoDB address
    #[arg(long, env = "INGEST_MONGO_ADDR")]
    pub mongo_addr: Option<String>,

    /// The name of the MongoDB database
    #[arg(long, env = "INGEST_DATABASE_NAME")]
    pub database_name: Option<String>,

    /// The cooldown (in minutes) between calls to the Codeforces API
    #[arg(long, env = "INGEST_COOLDOWN_MINUTES")]
    pub cooldown_minutes: Option<u64>,

    /// The number of recent actions to query on each API call
    #[arg(long = "cf-batch-size", env = "INGEST_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Timeout (in seconds) for a single Codeforces API call
    #[arg(long, env = "INGEST_FEED_TIMEOUT_SECS")]
    pub feed_timeout_secs: Option<u64>,

    #[arg(long, env = "INGEST_FEED_BASE_URL")]
    pub feed_base_url: Option<String>,

    /// Serve Prometheus metrics on this address
    #[arg(long, env = "INGEST_METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,
}

impl Cli {
    /// Load the config file, apply overrides and validate.
    pub fn resolve(self) -> Result<IngestConfig> {
        let mut cfg = match &self.config {
            Some(path) => load_config_from(path)?,
            None => load_config_default()?,
        };
        self.apply(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply(self, cfg: &mut IngestConfig) {
        if let Some(v) = self.environment {
            cfg.environment = v;
        }
        if let Some(v) = self.store {
            cfg.store = v;
        }
        if let Some(v) = self.mongo_addr {
            cfg.mongo_addr = v;
        }
        if let Some(v) = self.database_name {
            cfg.database_name = v;
        }
        if let Some(v) = self.cooldown_minutes {
            cfg.cooldown_minutes = v;
        }
        if let Some(v) = self.batch_size {
            cfg.batch_size = v;
        }
        if let Some(v) = self.feed_timeout_secs {
            cfg.feed_timeout_secs = v;
        }
        if let Some(v) = self.feed_base_url {
            cfg.feed_base_url = v;
        }
        if self.metrics_addr.is_some() {
            cfg.metrics_addr = self.metrics_addr;
        }
    }
}
