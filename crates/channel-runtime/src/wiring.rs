//! # Runtime Wiring
//!
//! Owns the registry and a dispatcher task, and coordinates shutdown.
//!
//! ```text
//! producers ──send──→ ChannelEndpoint ──queue──→ dispatcher task ──→ receivers
//!                           ↑                          ↑
//!                    ChannelRegistry             shutdown (watch)
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use shared_channel::{
    ChannelEndpoint, ChannelRegistry, DestinationId, Dispatcher, DispatcherHandle, Outcome,
    Receiver, RetryPolicy, RetryingSender, Sender,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::RuntimeConfig;
use crate::metered::{MeteredReceiver, MeteredSender};

/// Sender handed to producers by [`ChannelRuntime::register`].
///
/// [`Sender::send`] makes one metered attempt and never waits.
/// [`ProducerSender::send_with_retry`] re-attempts `Full` failures per the
/// runtime's retry policy, awaiting the backoff so the dispatcher task can
/// drain in the meantime. Every attempt is metered.
pub struct ProducerSender<T> {
    endpoint: MeteredSender<ChannelEndpoint<T>>,
    retry: RetryPolicy,
}

impl<T> ProducerSender<T> {
    pub fn destination(&self) -> &DestinationId {
        self.endpoint.destination()
    }

    /// Policy used by [`Self::send_with_retry`].
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }
}

impl<T: Clone + Send> ProducerSender<T> {
    /// Send, re-attempting capacity failures without blocking the runtime.
    ///
    /// # Errors
    ///
    /// The last failure once retries are exhausted, or the first
    /// non-retryable failure.
    pub async fn send_with_retry(&self, message: T) -> Outcome {
        RetryingSender::new(&self.endpoint, self.retry)
            .send_async(message)
            .await
    }
}

impl<T: Send> Sender<T> for ProducerSender<T> {
    fn send(&self, message: T) -> Outcome {
        self.endpoint.send(message)
    }
}

/// A registry plus the dispatcher task that runs its receivers.
pub struct ChannelRuntime {
    config: RuntimeConfig,
    registry: Arc<ChannelRegistry>,
    dispatcher: DispatcherHandle,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ChannelRuntime {
    /// Spawn the dispatcher on the current tokio runtime.
    pub fn start(config: RuntimeConfig) -> Self {
        let registry = Arc::new(ChannelRegistry::new(config.bus.clone()));
        let dispatcher = Dispatcher::new();
        let handle = dispatcher.handle();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(dispatcher.run(shutdown_rx));

        info!(
            capacity = config.bus.channel_capacity,
            retry_sends = config.retry_sends,
            "Channel runtime started"
        );

        Self {
            config,
            registry,
            dispatcher: handle,
            shutdown_tx,
            task,
        }
    }

    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    /// Handle of the runtime's dispatcher, for registering on the registry directly.
    pub fn dispatcher(&self) -> &DispatcherHandle {
        &self.dispatcher
    }

    /// Register a metered receiver on the runtime's dispatcher and return a
    /// metered sender for it.
    ///
    /// With `retry_sends` enabled, [`ProducerSender::send_with_retry`]
    /// re-attempts `Full` failures per the configured retry policy.
    pub fn register<T, R>(
        &self,
        destination: impl Into<DestinationId>,
        receiver: R,
    ) -> Result<ProducerSender<T>>
    where
        T: Send + 'static,
        R: Receiver<T> + 'static,
    {
        self.register_on(
            &self.dispatcher,
            destination,
            receiver,
            self.config.bus.channel_capacity,
        )
    }

    /// [`Self::register`] against another dispatcher with its own queue size.
    pub fn register_on<T, R>(
        &self,
        dispatcher: &DispatcherHandle,
        destination: impl Into<DestinationId>,
        receiver: R,
        capacity: usize,
    ) -> Result<ProducerSender<T>>
    where
        T: Send + 'static,
        R: Receiver<T> + 'static,
    {
        let destination = destination.into();
        let endpoint: ChannelEndpoint<T> = self
            .registry
            .register_channel_with_capacity(
                destination.clone(),
                MeteredReceiver::new(receiver, destination.clone()),
                dispatcher,
                capacity,
            )
            .with_context(|| format!("failed to register {destination}"))?;

        let retry = if self.config.retry_sends {
            self.config.bus.retry
        } else {
            RetryPolicy::none()
        };
        Ok(ProducerSender {
            endpoint: MeteredSender::new(endpoint, destination),
            retry,
        })
    }

    /// Stop the dispatcher after it drains what is already queued.
    pub async fn shutdown(self) -> Result<()> {
        // Err only if the dispatcher task already exited.
        let _ = self.shutdown_tx.send(true);
        self.task.await.context("dispatcher task panicked")?;
        info!("Channel runtime stopped");
        Ok(())
    }
}
