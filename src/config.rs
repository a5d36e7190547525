use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "hookhub.toml";
pub const ENV_PREFIX: &str = "HOOKHUB";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            logs: LogsConfig::default(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the HookHub API, including the `/api` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout. The backend defines none, so the console imposes one.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LogsConfig {
    /// Window used by `logs recent` when `--hours` is omitted
    #[serde(default)]
    pub default_hours: Option<u32>,

    /// Browser auto-refresh interval (0 disables)
    #[serde(default)]
    pub refresh_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Load configuration from `path` (optional) and `HOOKHUB__*` environment variables
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

/// Parse configuration from a TOML string, without environment overrides
pub fn from_toml_str(content: &str) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Toml))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    let base = url::Url::parse(&cfg.api.base_url)
        .map_err(|e| anyhow::anyhow!("Invalid api.base_url '{}': {}", cfg.api.base_url, e))?;
    if base.scheme() != "http" && base.scheme() != "https" {
        anyhow::bail!("api.base_url must use http or https, got '{}'", base.scheme());
    }

    if cfg.api.timeout_seconds == 0 {
        anyhow::bail!("api.timeout_seconds must be greater than 0");
    }

    if cfg.logs.default_hours == Some(0) {
        anyhow::bail!("logs.default_hours must be a positive number of hours");
    }

    match cfg.log_format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log_format '{}'. Must be one of: text, json", other),
    }

    Ok(())
}
