//! Command implementations for the CLI
//!
//! - subscriptions: List, show, create and delete subscriptions
//! - send: Trigger a test webhook delivery
//! - logs: Query delivery logs
//! - browse: Interactive delivery log browser
//! - sign: Compute or verify webhook signatures
//! - config: Configuration display and validation

pub mod browse;
pub mod config;
pub mod logs;
pub mod send;
pub mod sign;
pub mod subscriptions;

use anyhow::Result;
use hookhub_console::client::ApiClient;
use hookhub_console::config::Config;
use tracing::debug;

/// Build the API client described by the loaded configuration
pub fn api_client(cfg: &Config) -> Result<ApiClient> {
    let client = ApiClient::from_config(&cfg.api)?;
    debug!(
        base_url = %client.base_url(),
        timeout_seconds = cfg.api.timeout_seconds,
        "API client ready"
    );
    Ok(client)
}
