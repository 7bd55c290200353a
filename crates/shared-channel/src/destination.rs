//! # Destinations
//!
//! Identity and registration bookkeeping for the consumers that endpoints
//! deliver to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use uuid::Uuid;

/// Name of a logical destination (e.g. `"Logger"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationId(String);

impl DestinationId {
    /// Create a destination identity from a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The destination name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DestinationId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DestinationId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Snapshot of traffic through one registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    /// Messages accepted for delivery.
    pub accepted: u64,
    /// Send attempts that returned a failure.
    pub failed: u64,
    /// Messages handed to the destination's receiver.
    pub delivered: u64,
}

/// One binding of a destination to a queue.
///
/// Shared between the registry, every endpoint cloned from the binding, and
/// the dispatcher pump that owns the receiving side. Once revoked it never
/// becomes live again; re-registering the same name creates a new
/// `Registration` with a fresh id.
#[derive(Debug)]
pub(crate) struct Registration {
    id: Uuid,
    destination: DestinationId,
    live: AtomicBool,
    accepted: AtomicU64,
    failed: AtomicU64,
    delivered: AtomicU64,
}

impl Registration {
    pub(crate) fn new(destination: DestinationId) -> Self {
        Self {
            id: Uuid::new_v4(),
            destination,
            live: AtomicBool::new(true),
            accepted: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn destination(&self) -> &DestinationId {
        &self.destination
    }

    pub(crate) fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Marks the registration as gone. Returns `true` if this call revoked it.
    pub(crate) fn revoke(&self) -> bool {
        self.live.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self, count: u64) {
        self.delivered.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn stats(&self) -> ChannelStats {
        ChannelStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
        }
    }
}
