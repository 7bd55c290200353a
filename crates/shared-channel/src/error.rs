//! # Channel Errors
//!
//! Failure values returned by senders and by the registry.

use crate::destination::DestinationId;
use thiserror::Error;

/// Broad class of a send failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The destination is not (or no longer) reachable. A lifecycle or
    /// configuration problem; retrying the same endpoint will not help.
    Registration,
    /// The destination is reachable but this particular attempt failed.
    Delivery,
}

impl FailureKind {
    /// Label used in logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Delivery => "delivery",
        }
    }
}

/// Why a message could not be handed off.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    /// No destination with this identity is registered.
    #[error("Destination {destination} is not registered")]
    NotRegistered { destination: DestinationId },

    /// The endpoint's destination was deregistered after the endpoint was bound.
    #[error("Destination {destination} was deregistered")]
    Deregistered { destination: DestinationId },

    /// The dispatcher owning the destination was torn down.
    #[error("Destination {destination} is unreachable (dispatcher shut down)")]
    Disconnected { destination: DestinationId },

    /// The destination is bound to a different message type.
    #[error("Destination {destination} does not accept messages of type {expected}")]
    TypeMismatch {
        destination: DestinationId,
        expected: &'static str,
    },

    /// The destination's queue is at capacity.
    #[error("Destination {destination} is full ({capacity} messages queued)")]
    Full {
        destination: DestinationId,
        capacity: usize,
    },

    /// A component wrapping the endpoint refused the message.
    #[error("Delivery to {destination} rejected: {reason}")]
    Rejected {
        destination: DestinationId,
        reason: String,
    },
}

impl SendError {
    /// Whether this is a registration or a delivery failure.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotRegistered { .. }
            | Self::Deregistered { .. }
            | Self::Disconnected { .. }
            | Self::TypeMismatch { .. } => FailureKind::Registration,
            Self::Full { .. } | Self::Rejected { .. } => FailureKind::Delivery,
        }
    }

    #[must_use]
    pub fn is_registration_failure(&self) -> bool {
        self.kind() == FailureKind::Registration
    }

    /// Whether re-sending the same message may succeed later.
    ///
    /// Only capacity limits are transient; a rejection is a decision by the
    /// wrapping component and is not re-attempted.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Full { .. })
    }

    /// The destination the failed attempt was aimed at.
    #[must_use]
    pub fn destination(&self) -> &DestinationId {
        match self {
            Self::NotRegistered { destination }
            | Self::Deregistered { destination }
            | Self::Disconnected { destination }
            | Self::TypeMismatch { destination, .. }
            | Self::Full { destination, .. }
            | Self::Rejected { destination, .. } => destination,
        }
    }
}

/// Errors from registry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A live registration already exists under this identity.
    #[error("Destination {destination} is already registered")]
    AlreadyRegistered { destination: DestinationId },

    /// No registration exists under this identity.
    #[error("Destination {destination} is not registered")]
    NotRegistered { destination: DestinationId },

    /// The destination exists but carries a different message type.
    #[error("Destination {destination} does not accept messages of type {expected}")]
    TypeMismatch {
        destination: DestinationId,
        expected: &'static str,
    },

    /// A channel cannot be created with room for zero messages.
    #[error("Destination {destination} requested a zero-capacity queue")]
    InvalidCapacity { destination: DestinationId },

    /// The dispatcher that would run the receiver has been dropped.
    #[error("Dispatcher for {destination} is closed")]
    DispatcherClosed { destination: DestinationId },
}
