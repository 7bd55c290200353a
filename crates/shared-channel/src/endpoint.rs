//! # Channel Endpoint
//!
//! Queue-backed [`Sender`] bound to one registered destination.

use crate::destination::{DestinationId, Registration};
use crate::error::SendError;
use crate::sender::{Outcome, Sender};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Notify;
use tracing::{debug, warn};
use uuid::Uuid;

/// Write-side handle of a registered channel.
///
/// ## Send discipline
///
/// `send` is non-blocking queue-and-report. It never waits for space and
/// never waits for the destination; it either enqueues the message and
/// returns `Ok(())`, or returns the reason it could not:
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | Destination deregistered | `SendError::Deregistered` |
/// | Dispatcher torn down | `SendError::Disconnected` |
/// | Queue at capacity | `SendError::Full` (message not enqueued) |
///
/// ## Ordering
///
/// All clones of an endpoint share one FIFO queue, so messages sent
/// sequentially from one caller reach the receiver in the order sent.
pub struct ChannelEndpoint<T> {
    registration: Arc<Registration>,
    queue: mpsc::Sender<T>,
    wake: Arc<Notify>,
    capacity: usize,
}

impl<T> ChannelEndpoint<T> {
    pub(crate) fn new(
        registration: Arc<Registration>,
        queue: mpsc::Sender<T>,
        wake: Arc<Notify>,
        capacity: usize,
    ) -> Self {
        Self {
            registration,
            queue,
            wake,
            capacity,
        }
    }

    /// The destination this endpoint is bound to.
    #[must_use]
    pub fn destination(&self) -> &DestinationId {
        self.registration.destination()
    }

    /// Identity of the registration this endpoint was created from.
    #[must_use]
    pub fn registration_id(&self) -> Uuid {
        self.registration.id()
    }

    /// Maximum number of messages queued for the destination.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the destination is still registered and its dispatcher alive.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.registration.is_live() && !self.queue.is_closed()
    }

    fn fail(&self, error: SendError) -> Outcome {
        self.registration.record_failed();
        warn!(
            destination = %self.destination(),
            registration = %self.registration.id(),
            kind = error.kind().as_str(),
            error = %error,
            "Send failed"
        );
        Err(error)
    }
}

impl<T: Send> Sender<T> for ChannelEndpoint<T> {
    fn send(&self, message: T) -> Outcome {
        if !self.registration.is_live() {
            return self.fail(SendError::Deregistered {
                destination: self.destination().clone(),
            });
        }

        match self.queue.try_send(message) {
            Ok(()) => {
                self.registration.record_accepted();
                self.wake.notify_one();
                debug!(
                    destination = %self.destination(),
                    registration = %self.registration.id(),
                    "Message accepted"
                );
                Ok(())
            }
            Err(TrySendError::Full(_)) => self.fail(SendError::Full {
                destination: self.destination().clone(),
                capacity: self.capacity,
            }),
            Err(TrySendError::Closed(_)) => {
                // Receiving side is gone; nothing will ever drain this queue again.
                if self.registration.revoke() {
                    debug!(destination = %self.destination(), "Registration revoked on closed queue");
                }
                self.fail(SendError::Disconnected {
                    destination: self.destination().clone(),
                })
            }
        }
    }
}

impl<T> Clone for ChannelEndpoint<T> {
    fn clone(&self) -> Self {
        Self {
            registration: self.registration.clone(),
            queue: self.queue.clone(),
            wake: self.wake.clone(),
            capacity: self.capacity,
        }
    }
}

impl<T> fmt::Debug for ChannelEndpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelEndpoint")
            .field("destination", self.destination())
            .field("registration", &self.registration.id())
            .field("capacity", &self.capacity)
            .finish()
    }
}
