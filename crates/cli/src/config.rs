//! CLI configuration.
//!
//! Layered with `figment`, lowest to highest precedence:
//!
//! 1. built-in defaults;
//! 2. `.teardown/config.toml`, or the file given with `--config`;
//! 3. `TEARDOWN_*` environment variables, `__` separating nested keys
//!    (e.g. `TEARDOWN_TEARDOWN__DEFAULT_JOB`, `TEARDOWN_LOGGING__LEVEL`).
//!
//! ```toml
//! snapshot = "host.json"
//!
//! [teardown]
//! default_job = "platform/teardown"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! otlp_endpoint = "http://localhost:4317"
//! ```

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use teardown::TeardownConfig;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = ".teardown/config.toml";
pub const ENV_PREFIX: &str = "TEARDOWN_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file '{0}' does not exist")]
    MissingFile(PathBuf),

    #[error("Invalid configuration")]
    Extract(#[from] figment::Error),

    #[error("Invalid log level '{0}'. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Log output encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level; `RUST_LOG` overrides it when set.
    pub level: String,
    pub format: LogFormat,
    /// OTLP gRPC collector endpoint. Span export is off when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            otlp_endpoint: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Global teardown settings handed to the listener.
    #[serde(default)]
    pub teardown: TeardownConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Host snapshot to load.
    pub snapshot: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            teardown: TeardownConfig::default(),
            logging: LoggingConfig::default(),
            snapshot: PathBuf::from(".teardown/host.json"),
        }
    }
}

/// Builds the provider stack without extracting it.
pub fn figment(path: Option<&Path>) -> Figment {
    let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    Figment::new()
        .merge(Serialized::defaults(CliConfig::default()))
        .merge(Toml::file(file))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Loads and validates the configuration.
///
/// The default file is optional; a file named explicitly must exist.
pub fn load(path: Option<&Path>) -> Result<CliConfig, ConfigError> {
    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
    }
    let config: CliConfig = figment(path).extract()?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &CliConfig) -> Result<(), ConfigError> {
    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
    }
    Ok(())
}
