//! # Channel Runtime
//!
//! Process-level wiring for message channels.
//!
//! ## Modular Structure
//!
//! - `config` - Runtime configuration (JSON file or environment)
//! - `metered` - Sender/receiver decorators that feed Prometheus counters
//! - `wiring` - Registry + dispatcher task with coordinated shutdown
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (metrics, logging)
//! 2. Load configuration (from file/env)
//! 3. Start the dispatcher task
//! 4. Register destinations, hand endpoints to producers
//! 5. On shutdown, stop the dispatcher after a final drain

pub mod config;
pub mod metered;
pub mod wiring;

pub use config::RuntimeConfig;
pub use metered::{MeteredReceiver, MeteredSender};
pub use wiring::{ChannelRuntime, ProducerSender};
