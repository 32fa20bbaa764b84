//! Configuration Module
//!
//! Loads cache and retry tuning from environment variables. The cache and the
//! retry executor take these values as constructor parameters and never read
//! the environment themselves.

use std::env;
use std::time::Duration;

use crate::cache::{DEFAULT_CLEANUP_INTERVAL, DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
use crate::error::ConfigError;
use crate::retry::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};

/// Cache and retry configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Capacity ceiling that triggers oldest-first eviction
    pub max_entries: usize,
    /// Default TTL in milliseconds for entries stored without one
    pub default_ttl_ms: u64,
    /// Background sweep interval in milliseconds
    pub cleanup_interval_ms: u64,
    /// Attempts per upstream call, the first one included
    pub retry_max_attempts: u32,
    /// Wait in milliseconds before the first retry
    pub retry_base_delay_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 100)
    /// - `CACHE_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_CLEANUP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 60000)
    /// - `RETRY_MAX_ATTEMPTS` - Attempts per upstream call (default: 3)
    /// - `RETRY_BASE_DELAY_MS` - First backoff delay in milliseconds (default: 1000)
    ///
    /// Unset variables fall back to their defaults; set but malformed or zero
    /// values are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            max_entries: read_positive("CACHE_MAX_SIZE", defaults.max_entries)?,
            default_ttl_ms: read_positive("CACHE_TTL_MS", defaults.default_ttl_ms)?,
            cleanup_interval_ms: read_positive(
                "CACHE_CLEANUP_INTERVAL_MS",
                defaults.cleanup_interval_ms,
            )?,
            retry_max_attempts: read_positive("RETRY_MAX_ATTEMPTS", defaults.retry_max_attempts)?,
            retry_base_delay_ms: read_var("RETRY_BASE_DELAY_MS", defaults.retry_base_delay_ms)?,
        })
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl_ms: DEFAULT_TTL.as_millis() as u64,
            cleanup_interval_ms: DEFAULT_CLEANUP_INTERVAL.as_millis() as u64,
            retry_max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_BASE_DELAY.as_millis() as u64,
        }
    }
}

fn read_var<N>(var: &'static str, default: N) -> Result<N, ConfigError>
where
    N: std::str::FromStr,
{
    match env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::NotANumber {
            var,
            value: raw.clone(),
        }),
        Err(_) => Ok(default),
    }
}

fn read_positive<N>(var: &'static str, default: N) -> Result<N, ConfigError>
where
    N: std::str::FromStr + Default + PartialEq,
{
    let value = read_var(var, default)?;
    if value == N::default() {
        return Err(ConfigError::Zero { var });
    }
    Ok(value)
}
