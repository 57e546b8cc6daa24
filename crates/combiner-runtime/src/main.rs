//! # Threshold Combiner Runtime
//!
//! Entry point for the combiner service.
//!
//! ## Startup Sequence
//!
//! 1. Install the tracing subscriber (`RUST_LOG`, `COMBINER_LOG_FORMAT`)
//! 2. Load configuration from `COMBINER_CONFIG` (default `combiner.toml`)
//! 3. Apply `COMBINER_HOST` / `COMBINER_PORT` overrides
//! 4. Build the gateway and serve until Ctrl+C
//!
//! A missing configuration file is not an error: both services start
//! disabled and every signing endpoint answers 501.

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tc_03_signer_dispatch::HttpSignerTransport;
use tc_04_combiner_gateway::{CombinerConfig, CombinerService, HeaderAuthenticator};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "combiner.toml";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let path = std::env::var("COMBINER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = load_config(Path::new(&path))?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    let transport = HttpSignerTransport::new().context("failed to build signer HTTP client")?;
    let service = CombinerService::new(
        config,
        Arc::new(transport),
        Arc::new(HeaderAuthenticator::new()),
    )
    .context("invalid combiner configuration")?;

    service
        .start(shutdown_signal())
        .await
        .context("combiner server failed")?;

    info!("Shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    match std::env::var("COMBINER_LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}

/// Read the TOML file at `path`, falling back to defaults when it does not exist.
fn load_config(path: &Path) -> Result<CombinerConfig> {
    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(CombinerConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = parse_config(&raw).with_context(|| format!("failed to parse {}", path.display()))?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

fn parse_config(raw: &str) -> Result<CombinerConfig, toml::de::Error> {
    toml::from_str(raw)
}

/// Listener overrides from the environment. Unparseable values are ignored.
fn apply_env_overrides<F>(config: &mut CombinerConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("COMBINER_HOST") {
        match host.parse::<IpAddr>() {
            Ok(ip) => config.server.host = ip,
            Err(_) => warn!(%host, "COMBINER_HOST is not an IP address"),
        }
    }
    if let Some(port) = lookup("COMBINER_PORT") {
        match port.parse::<u16>() {
            Ok(p) => config.server.port = p,
            Err(_) => warn!(%port, "COMBINER_PORT is not a port number"),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Initiating graceful shutdown...");
}
