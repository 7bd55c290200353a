//! # Channel Runtime
//!
//! Starts a registry and dispatcher, then walks through the outcomes a
//! producer can observe:
//!
//! 1. `Logger` registered: `send("hello")` succeeds and the receiver logs it
//! 2. `QueueFull` (capacity 1, never drained): the second send is a
//!    delivery failure
//! 3. `Logger` deregistered: the same sender now reports a registration
//!    failure
//!
//! Usage: `channel-runtime [config.json]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use channel_runtime::{ChannelRuntime, RuntimeConfig};
use channel_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use shared_channel::{DestinationId, Dispatcher, Outcome, Sender};
use tracing::{error, info, warn};

fn report(step: &str, outcome: &Outcome) {
    match outcome {
        Ok(()) => info!(step, "Send accepted"),
        Err(e) => warn!(
            step,
            destination = %e.destination(),
            kind = e.kind().as_str(),
            retryable = e.is_retryable(),
            error = %e,
            "Send failed"
        ),
    }
}

async fn run(config: RuntimeConfig) -> Result<()> {
    let runtime = ChannelRuntime::start(config);

    // Scenario 1: registered destination
    let logger = runtime.register("Logger", |line: String| {
        info!(%line, "Logger received");
    })?;
    report("logger", &logger.send_with_retry("hello".to_string()).await);

    // Scenario 2: capacity limit. The stalled dispatcher is never pumped.
    let stalled = Dispatcher::new();
    let queue_full = runtime.register_on(&stalled.handle(), "QueueFull", |_: String| {}, 1)?;
    report("queue-full first", &queue_full.send("m1".to_string()));
    report("queue-full second", &queue_full.send("m2".to_string()));

    // Scenario 3: deregistered destination
    runtime
        .registry()
        .deregister(&DestinationId::new("Logger"))
        .context("failed to deregister Logger")?;
    report("logger after deregister", &logger.send("hello".to_string()));

    drop(stalled);
    runtime.shutdown().await
}

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).context("failed to initialize telemetry")?;

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = RuntimeConfig::load(config_path.as_deref())?;

    if let Err(e) = run(config).await {
        error!(error = %e, "Channel runtime failed");
        return Err(e);
    }

    match encode_metrics() {
        Ok(text) => println!("{text}"),
        Err(e) => warn!(error = %e, "Failed to encode metrics"),
    }
    Ok(())
}
