//! Recent-actions ingester: binary entrypoint.
//! Resolves config, installs logging/metrics, connects the feed and the store,
//! then runs the scheduler until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use recent_actions_ingest::cli::Cli;
use recent_actions_ingest::ingest::config::StoreKind;
use recent_actions_ingest::ingest::providers::codeforces::CodeforcesClient;
use recent_actions_ingest::{telemetry, ActionStore, MemoryStore, MongoStore, Scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cfg = Cli::parse().resolve()?;
    telemetry::init_tracing(cfg.environment)?;
    if let Some(addr) = cfg.metrics_addr {
        telemetry::install_metrics_exporter(addr)?;
    }
    info!(environment = ?cfg.environment, store = ?cfg.store, "starting recent actions ingest");

    // Construction failures are fatal: there is no watermark to work from yet.
    let feed = CodeforcesClient::new(cfg.feed_base_url.clone(), cfg.feed_timeout())?;
    let store: Arc<dyn ActionStore> = match cfg.store {
        StoreKind::Mongo => Arc::new(
            MongoStore::connect(&cfg.mongo_addr, &cfg.database_name)
                .await
                .context("connecting to mongo store")?,
        ),
        StoreKind::Memory => Arc::new(MemoryStore::new()),
    };

    let scheduler = Scheduler::resume(Arc::new(feed), store, cfg.scheduler_cfg()).await;

    let cancel = CancellationToken::new();
    let worker = scheduler.spawn(cancel.clone());

    tokio::signal::ctrl_c()
        .await
        .context("listening for ctrl-c")?;
    info!("shutdown requested");
    cancel.cancel();

    let watermark = worker.await.context("scheduler task")?;
    info!(watermark, "bye");
    Ok(())
}
