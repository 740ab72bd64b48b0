pub mod api;
pub mod config;
pub mod envelope;
pub mod error;
pub mod security;
pub mod upstream;

use std::sync::Arc;

use config::GatewayConfig;

/// Immutable per-process state shared with every handler.
pub struct Gateway {
    pub config: GatewayConfig,
    pub http: reqwest::Client,
}

impl Gateway {
    pub fn new(config: GatewayConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }
}

pub type AppState = Arc<Gateway>;
