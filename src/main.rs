use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{self, EnvFilter};

use opsgate::config::GatewayConfig;
use opsgate::{api, upstream, Gateway};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real deployments set the environment directly.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = GatewayConfig::from_env().context("invalid gateway configuration")?;
    tracing::info!(
        "opsgate starting: {} allowed origins/domains, {} api keys, auth headers {} / {}",
        config.security.allowed.len(),
        config.security.api_keys.len(),
        config.security.custom_auth_header,
        config.security.api_key_header,
    );

    // Upstream settings are checked per request; just flag the gaps early.
    for settings in [&config.netbox, &config.zabbix] {
        if let Err(e) = settings.resolve() {
            tracing::warn!("{:?} upstream not usable yet: {}", settings.kind(), e);
        }
    }

    let http = upstream::http_client().context("building upstream HTTP client")?;
    let state = Arc::new(Gateway::new(config, http));

    api::start_server(state).await.context("gateway server failed")?;
    Ok(())
}
