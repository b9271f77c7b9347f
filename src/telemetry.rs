// src/telemetry.rs
use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::ingest::config::Environment;

/// Default filter when `RUST_LOG` is not set.
fn default_directives(env: Environment) -> &'static str {
    match env {
        Environment::Dev => "info,recent_actions_ingest=debug,ingest=debug,feed=debug,store=debug",
        Environment::Prod => "info",
    }
}

/// Install the global tracing subscriber.
///
/// `dev` gets compact human-readable lines, `prod` gets JSON. `RUST_LOG`
/// overrides the level in both.
pub fn init_tracing(env: Environment) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(env)));

    let registry = tracing_subscriber::registry().with(filter);
    match env {
        Environment::Dev => registry.with(fmt::layer().compact()).try_init(),
        Environment::Prod => registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init(),
    }
    .context("installing tracing subscriber")
}

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
/// Must be called from inside a tokio runtime.
pub fn install_metrics_exporter(addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("installing prometheus exporter")?;
    tracing::info!(%addr, "metrics exporter listening");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse() {
        for env in [Environment::Dev, Environment::Prod] {
            assert!(default_directives(env)
                .parse::<EnvFilter>()
                .is_ok());
        }
    }
}
