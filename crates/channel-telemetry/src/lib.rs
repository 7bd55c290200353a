//! # Channel Telemetry
//!
//! Logging and metrics for message channel deployments.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with `EnvFilter`, plain or JSON output
//! - **Metrics**: Prometheus counters for channel traffic
//!
//! ## Usage
//!
//! ```rust,ignore
//! use channel_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_telemetry(&config).expect("Failed to init telemetry");
//!
//!     // Channel traffic is now logged and counted
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CHANNEL_SERVICE_NAME` | `message-channel` | Service name in logs |
//! | `CHANNEL_LOG_LEVEL` | `info` | Log level filter |
//! | `CHANNEL_JSON_LOGS` | `false` | JSON log output |
//! | `CHANNEL_CONSOLE_OUTPUT` | `true` | Log to stdout at all |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, record_delivered, record_send, register_metrics, HistogramTimer,
    CHANNEL_MESSAGES_DELIVERED, CHANNEL_MESSAGES_SENT, CHANNEL_SEND_DURATION,
    CHANNEL_SEND_FAILURES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logger: {0}")]
    LoggerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize metrics and logging.
///
/// Metrics are registered first so nothing is lost if logging fails.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}

/// Start timing a send. Observation happens on drop.
#[macro_export]
macro_rules! time_send {
    () => {
        $crate::metrics::HistogramTimer::new(&$crate::metrics::CHANNEL_SEND_DURATION)
    };
}
