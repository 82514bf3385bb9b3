//! Headless host bridge binary for stdin/stdout JSON communication.
//!
//! This binary reads `RequestEnvelope` messages as newline-delimited JSON
//! from stdin, handles each report request, and writes one
//! `ResponseEnvelope` per line to stdout.
//!
//! All tracing/diagnostic output goes to stderr so that stdout remains a
//! clean JSON protocol channel. The config file path can be overridden with
//! `CARBON_CONFIG`.

use std::path::PathBuf;

use carbon::CarbonConfig;
use carbon::host::stdio::{ConfigHandler, run_stdio_bridge};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise tracing to stderr only (stdout is reserved for the JSON
    // protocol).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("carbon=info,carbon_resolve=info")
            }),
        )
        .init();

    let path = std::env::var_os("CARBON_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(CarbonConfig::default_config_path);
    let config = CarbonConfig::load(&path)
        .map_err(|e| anyhow::anyhow!("failed to load config from {}: {e}", path.display()))?;
    config.validate()?;

    tracing::info!(
        primary_credentials = config.resolve.primary.usable_len(),
        secondary_credentials = config.resolve.secondary.credentials().len(),
        accounts = config.accounts.len(),
        "carbon-host starting"
    );

    run_stdio_bridge(ConfigHandler::new(config))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "carbon-host exited with error");
            anyhow::anyhow!("carbon-host failed: {e}")
        })?;

    tracing::info!("carbon-host shut down cleanly");
    Ok(())
}
