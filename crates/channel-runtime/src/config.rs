//! Runtime configuration.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shared_channel::BusConfig;

/// Top-level runtime settings.
///
/// ```json
/// {
///   "bus": { "channel_capacity": 256, "retry": { "max_attempts": 5, "backoff_ms": 20 } },
///   "retry_sends": true
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Channel settings.
    pub bus: BusConfig,

    /// Wrap handed-out endpoints in a retrying sender.
    pub retry_sends: bool,
}

impl RuntimeConfig {
    /// Load from a JSON file, or from the environment when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => Self {
                bus: BusConfig::from_env(),
                retry_sends: std::env::var("CHANNEL_RETRY_SENDS")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
            },
        };

        config.bus.validate().context("invalid channel configuration")?;
        Ok(config)
    }
}
