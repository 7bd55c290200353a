//! # Sender
//!
//! The write side of a one-way message channel.

use crate::error::SendError;
use std::sync::Arc;

/// Result of a single send attempt.
///
/// `Ok(())` means the message was accepted for delivery to the bound
/// destination. `Err` carries the reason the handoff could not happen.
pub type Outcome = Result<(), SendError>;

/// The sending end of a message channel.
///
/// A sender is bound to exactly one destination for its whole lifetime.
/// Implementations must report every failed handoff through the returned
/// [`Outcome`]: a message is never dropped silently, and a call never blocks
/// waiting for a destination that is gone.
///
/// Whether `send` blocks, and what ordering it guarantees beyond FIFO for a
/// single caller on a single sender, is documented by each implementation.
pub trait Sender<T>: Send + Sync {
    /// Hands `message` off to the bound destination.
    fn send(&self, message: T) -> Outcome;
}

impl<T, S> Sender<T> for &S
where
    S: Sender<T> + ?Sized,
{
    fn send(&self, message: T) -> Outcome {
        (**self).send(message)
    }
}

impl<T, S> Sender<T> for Box<S>
where
    S: Sender<T> + ?Sized,
{
    fn send(&self, message: T) -> Outcome {
        (**self).send(message)
    }
}

impl<T, S> Sender<T> for Arc<S>
where
    S: Sender<T> + ?Sized,
{
    fn send(&self, message: T) -> Outcome {
        (**self).send(message)
    }
}
