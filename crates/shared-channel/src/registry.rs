//! # Channel Registry
//!
//! Maps destination identities to live endpoints.
//!
//! ## Lifecycle
//!
//! ```text
//! register_channel()  ──→  endpoint usable      (send -> Ok / Full)
//! deregister()        ──→  endpoint revoked     (send -> Deregistered)
//! dispatcher dropped  ──→  endpoint disconnected (send -> Disconnected)
//! ```
//!
//! A destination is bound once per registration. Registering the same
//! name again after deregistration yields a fresh endpoint; endpoints from
//! the earlier registration stay revoked.

use crate::config::BusConfig;
use crate::destination::{ChannelStats, DestinationId, Registration};
use crate::dispatcher::DispatcherHandle;
use crate::endpoint::ChannelEndpoint;
use crate::error::{RegistryError, SendError};
use crate::receiver::Receiver;
use crate::sender::{Outcome, Sender};
use parking_lot::RwLock;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, info, warn};

struct Entry {
    registration: Arc<Registration>,
    /// A `ChannelEndpoint<T>` for the registered message type.
    endpoint: Box<dyn Any + Send + Sync>,
    /// Reports whether the receiving side of the queue is gone.
    queue_closed: Box<dyn Fn() -> bool + Send + Sync>,
    wake: Arc<Notify>,
}

impl Entry {
    /// Live until deregistered or until its dispatcher is dropped.
    fn is_live(&self) -> bool {
        self.registration.is_live() && !(self.queue_closed)()
    }
}

/// Registry of destinations and the endpoints bound to them.
pub struct ChannelRegistry {
    entries: RwLock<HashMap<DestinationId, Entry>>,
    config: BusConfig,
}

impl ChannelRegistry {
    /// Create a registry whose channels use `config.channel_capacity`.
    #[must_use]
    pub fn new(config: BusConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// The configuration this registry was built with.
    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Register `receiver` as `destination`, running on `dispatcher`.
    ///
    /// Returns the endpoint producers use to reach it. Further endpoints for
    /// the same registration can be obtained with [`Self::endpoint`] or by
    /// cloning. The queue holds `config.channel_capacity` messages.
    ///
    /// # Errors
    ///
    /// - `AlreadyRegistered` if a live registration exists under this name
    /// - `DispatcherClosed` if the dispatcher has been dropped
    pub fn register_channel<T, R>(
        &self,
        destination: impl Into<DestinationId>,
        receiver: R,
        dispatcher: &DispatcherHandle,
    ) -> Result<ChannelEndpoint<T>, RegistryError>
    where
        T: Send + 'static,
        R: Receiver<T> + 'static,
    {
        self.register_channel_with_capacity(
            destination,
            receiver,
            dispatcher,
            self.config.channel_capacity,
        )
    }

    /// [`Self::register_channel`] with a queue size for this destination only.
    ///
    /// # Errors
    ///
    /// As [`Self::register_channel`], plus `InvalidCapacity` for a zero capacity.
    pub fn register_channel_with_capacity<T, R>(
        &self,
        destination: impl Into<DestinationId>,
        receiver: R,
        dispatcher: &DispatcherHandle,
        capacity: usize,
    ) -> Result<ChannelEndpoint<T>, RegistryError>
    where
        T: Send + 'static,
        R: Receiver<T> + 'static,
    {
        let destination = destination.into();
        let mut entries = self.entries.write();

        if let Some(existing) = entries.get(&destination) {
            if existing.is_live() {
                return Err(RegistryError::AlreadyRegistered { destination });
            }
            // Stale entry left by a torn-down dispatcher; replace it.
            debug!(destination = %destination, "Replacing stale registration");
            existing.registration.revoke();
        }

        if capacity == 0 {
            return Err(RegistryError::InvalidCapacity { destination });
        }

        let registration = Arc::new(Registration::new(destination.clone()));
        let (queue_tx, queue_rx) = mpsc::channel(capacity);

        if !dispatcher.attach(registration.clone(), queue_rx, Box::new(receiver)) {
            registration.revoke();
            return Err(RegistryError::DispatcherClosed { destination });
        }

        let wake = dispatcher.wake();
        let watched = queue_tx.clone();
        let endpoint = ChannelEndpoint::new(registration.clone(), queue_tx, wake.clone(), capacity);

        info!(
            destination = %destination,
            registration = %registration.id(),
            message_type = type_name::<T>(),
            capacity,
            "Channel registered"
        );

        entries.insert(
            destination,
            Entry {
                registration,
                endpoint: Box::new(endpoint.clone()),
                queue_closed: Box::new(move || watched.is_closed()),
                wake,
            },
        );

        Ok(endpoint)
    }

    /// Remove `destination`. Outstanding endpoints fail from now on with
    /// `SendError::Deregistered`; messages they already queued are still
    /// delivered.
    ///
    /// # Errors
    ///
    /// `NotRegistered` if no registration exists under this name.
    pub fn deregister(&self, destination: &DestinationId) -> Result<(), RegistryError> {
        let Some(entry) = self.entries.write().remove(destination) else {
            return Err(RegistryError::NotRegistered {
                destination: destination.clone(),
            });
        };

        entry.registration.revoke();
        entry.wake.notify_one();

        info!(
            destination = %destination,
            registration = %entry.registration.id(),
            "Channel deregistered"
        );
        Ok(())
    }

    /// A typed endpoint for a live destination.
    ///
    /// # Errors
    ///
    /// - `NotRegistered` if the destination is unknown or no longer live
    /// - `TypeMismatch` if it was registered with a different message type
    pub fn endpoint<T>(&self, destination: &DestinationId) -> Result<ChannelEndpoint<T>, RegistryError>
    where
        T: Send + 'static,
    {
        let entries = self.entries.read();
        let entry = entries
            .get(destination)
            .filter(|entry| entry.is_live())
            .ok_or_else(|| RegistryError::NotRegistered {
                destination: destination.clone(),
            })?;

        entry
            .endpoint
            .downcast_ref::<ChannelEndpoint<T>>()
            .cloned()
            .ok_or_else(|| RegistryError::TypeMismatch {
                destination: destination.clone(),
                expected: type_name::<T>(),
            })
    }

    /// A sender that looks `destination` up on every call.
    ///
    /// Unlike an endpoint it is not tied to one registration: it follows
    /// re-registrations, and reports `NotRegistered` while none is live.
    #[must_use]
    pub fn sender_for<T>(self: &Arc<Self>, destination: impl Into<DestinationId>) -> RoutedSender<T>
    where
        T: Send + 'static,
    {
        RoutedSender {
            registry: self.clone(),
            destination: destination.into(),
            _message: PhantomData,
        }
    }

    /// Whether a live registration exists under `destination`.
    #[must_use]
    pub fn is_registered(&self, destination: &DestinationId) -> bool {
        self.entries
            .read()
            .get(destination)
            .is_some_and(Entry::is_live)
    }

    /// Names of all live destinations, sorted.
    #[must_use]
    pub fn destinations(&self) -> Vec<DestinationId> {
        let mut names: Vec<_> = self
            .entries
            .read()
            .iter()
            .filter(|(_, entry)| entry.is_live())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Traffic counters for the current registration of `destination`.
    #[must_use]
    pub fn stats(&self, destination: &DestinationId) -> Option<ChannelStats> {
        self.entries
            .read()
            .get(destination)
            .map(|entry| entry.registration.stats())
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

/// [`Sender`] that resolves its destination through a [`ChannelRegistry`]
/// on every send.
///
/// A destination that is missing, or bound to another message type, is a
/// registration failure: re-sending cannot succeed until the binding changes.
pub struct RoutedSender<T> {
    registry: Arc<ChannelRegistry>,
    destination: DestinationId,
    _message: PhantomData<fn(T)>,
}

impl<T> RoutedSender<T> {
    #[must_use]
    pub fn destination(&self) -> &DestinationId {
        &self.destination
    }
}

impl<T: Send + 'static> Sender<T> for RoutedSender<T> {
    fn send(&self, message: T) -> Outcome {
        match self.registry.endpoint::<T>(&self.destination) {
            Ok(endpoint) => endpoint.send(message),
            Err(RegistryError::TypeMismatch { expected, .. }) => {
                warn!(destination = %self.destination, expected, "Routed send type mismatch");
                Err(SendError::TypeMismatch {
                    destination: self.destination.clone(),
                    expected,
                })
            }
            Err(_) => {
                warn!(destination = %self.destination, "Routed send to unregistered destination");
                Err(SendError::NotRegistered {
                    destination: self.destination.clone(),
                })
            }
        }
    }
}

impl<T> Clone for RoutedSender<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            destination: self.destination.clone(),
            _message: PhantomData,
        }
    }
}
