//! # Channel Configuration
//!
//! Settings shared by every channel a registry creates.

use crate::retry::RetryPolicy;
use crate::DEFAULT_CHANNEL_CAPACITY;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Channel capacity must be at least 1")]
    ZeroCapacity,

    #[error("Retry policy must allow at least one attempt")]
    ZeroAttempts,
}

/// Channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Messages queued per destination before sends report `Full`.
    pub channel_capacity: usize,

    /// Policy for [`RetryingSender`](crate::RetryingSender) wrappers built
    /// from this config.
    pub retry: RetryPolicy,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            retry: RetryPolicy::default(),
        }
    }
}

impl BusConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CHANNEL_CAPACITY`: Messages queued per destination (default: 1000)
    /// - `CHANNEL_RETRY_ATTEMPTS`: Attempts per retried send (default: 3)
    /// - `CHANNEL_RETRY_BACKOFF_MS`: Pause between attempts (default: 10)
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            channel_capacity: env_parse("CHANNEL_CAPACITY").unwrap_or(defaults.channel_capacity),
            retry: RetryPolicy {
                max_attempts: env_parse("CHANNEL_RETRY_ATTEMPTS")
                    .unwrap_or(defaults.retry.max_attempts),
                backoff: env_parse("CHANNEL_RETRY_BACKOFF_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.retry.backoff),
            },
        }
    }

    /// Reject settings no channel can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
