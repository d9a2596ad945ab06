//! Replay configuration loaded from environment variables.
//!
//! | Variable                | Default | Meaning                                 |
//! |-------------------------|---------|-----------------------------------------|
//! | `BANKING_LOG`           | `info`  | tracing filter directive                |
//! | `BANKING_OUTPUT`        | `text`  | report format, `text` or `json`         |
//! | `BANKING_STOP_ON_ERROR` | `false` | stop the replay at the first rejection  |

use std::env;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;

pub const LOG_ENV: &str = "BANKING_LOG";
pub const OUTPUT_ENV: &str = "BANKING_OUTPUT";
pub const STOP_ON_ERROR_ENV: &str = "BANKING_STOP_ON_ERROR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayConfig {
    pub log_filter: String,
    pub output: OutputFormat,
    pub stop_on_error: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            output: OutputFormat::Text,
            stop_on_error: false,
        }
    }
}

impl ReplayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. Unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_filter = match lookup(LOG_ENV) {
            Some(value) if !value.trim().is_empty() => parse_log_filter(value)?,
            _ => defaults.log_filter,
        };

        let output = match lookup(OUTPUT_ENV) {
            Some(value) => parse_output(&value)?,
            None => defaults.output,
        };

        let stop_on_error = match lookup(STOP_ON_ERROR_ENV) {
            Some(value) => parse_flag(STOP_ON_ERROR_ENV, &value)?,
            None => defaults.stop_on_error,
        };

        Ok(Self {
            log_filter,
            output,
            stop_on_error,
        })
    }
}

fn parse_log_filter(value: String) -> Result<String, ConfigError> {
    match EnvFilter::try_new(&value) {
        Ok(_) => Ok(value),
        Err(err) => Err(ConfigError::InvalidValue {
            key: LOG_ENV.to_string(),
            message: format!("`{value}` is not a valid filter directive: {err}"),
        }),
    }
}

fn parse_output(value: &str) -> Result<OutputFormat, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => Err(ConfigError::InvalidValue {
            key: OUTPUT_ENV.to_string(),
            message: format!("expected `text` or `json`, got `{other}`"),
        }),
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got `{other}`"),
        }),
    }
}
