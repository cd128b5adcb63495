use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

use crate::presence::SweepConfig;

pub const BIND_ADDR_VAR: &str = "BATEPAPO_BIND_ADDR";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const SWEEP_INTERVAL_VAR: &str = "BATEPAPO_SWEEP_INTERVAL_MS";
pub const INACTIVITY_THRESHOLD_VAR: &str = "BATEPAPO_INACTIVITY_THRESHOLD_MS";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidAddress { var: &'static str, value: String },

    #[error("{var} must be a positive number of milliseconds, got {value}")]
    InvalidDuration { var: &'static str, value: String },
}

/// Runtime configuration, read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection string; in-memory storage when absent
    pub database_url: Option<String>,
    pub sweep: SweepConfig,
}

impl AppConfig {
    /// Reads configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = match lookup(BIND_ADDR_VAR) {
            Some(value) => value.parse::<SocketAddr>().map_err(|_| ConfigError::InvalidAddress {
                var: BIND_ADDR_VAR,
                value,
            })?,
            None => DEFAULT_BIND_ADDR
                .parse::<SocketAddr>()
                .map_err(|_| ConfigError::InvalidAddress {
                    var: BIND_ADDR_VAR,
                    value: DEFAULT_BIND_ADDR.to_string(),
                })?,
        };

        let database_url = lookup(DATABASE_URL_VAR).filter(|url| !url.is_empty());

        let defaults = SweepConfig::default();
        let sweep = SweepConfig {
            sweep_interval: duration_var(&lookup, SWEEP_INTERVAL_VAR)?
                .unwrap_or(defaults.sweep_interval),
            inactivity_threshold: duration_var(&lookup, INACTIVITY_THRESHOLD_VAR)?
                .unwrap_or(defaults.inactivity_threshold),
        };

        Ok(Self {
            bind_addr,
            database_url,
            sweep,
        })
    }
}

fn duration_var<F>(lookup: &F, var: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => match value.parse::<u64>() {
            Ok(ms) if ms > 0 => Ok(Some(Duration::from_millis(ms))),
            _ => Err(ConfigError::InvalidDuration { var, value }),
        },
    }
}
