//! `wellspring serve` — start the chat web server.

use anyhow::Context;
use std::path::Path;
use wellspring_config::AppConfig;

pub async fn run(config_path: &Path, port: Option<u16>) -> anyhow::Result<()> {
    let mut config =
        AppConfig::load_from(config_path).context("Failed to load configuration")?;

    if let Some(port) = port {
        config.server.port = port;
    }

    wellspring_gateway::serve(config)
        .await
        .map_err(|e| anyhow::anyhow!("Gateway failed: {e}"))
}
