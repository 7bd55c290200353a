//! # Shared Channel - Typed Message Channels
//!
//! A one-way, typed handoff between a producer and exactly one registered
//! destination. Producers hold a [`Sender`] and never a reference to the
//! component that consumes their messages.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐                         ┌──────────────┐
//! │   Producer   │                         │ Destination  │
//! │              │  send() -> Outcome      │ (Receiver<T>)│
//! │              │ ──────┐                 │              │
//! └──────────────┘       │                 └──────────────┘
//!                        ▼                         ↑
//!              ┌──────────────────┐      ┌─────────┴────────┐
//!              │ ChannelEndpoint  │ ───→ │    Dispatcher    │
//!              │  (bounded queue) │      │ on_receive(msg)  │
//!              └──────────────────┘      └──────────────────┘
//!                        ↑
//!              ┌──────────────────┐
//!              │ ChannelRegistry  │  register / deregister
//!              └──────────────────┘
//! ```
//!
//! ## Outcome Contract
//!
//! Every call to [`Sender::send`] returns exactly one [`Outcome`]:
//!
//! - `Ok(())` - the message was accepted for delivery. It has not necessarily
//!   been processed yet.
//! - `Err(SendError)` - the handoff did not happen. [`SendError::kind`] tells a
//!   **registration** failure (destination unknown, deregistered or torn down)
//!   apart from a **delivery** failure (destination reachable, this attempt
//!   refused, e.g. queue at capacity).
//!
//! Endpoints never retry and never buffer beyond their bounded queue. Retry is
//! opt-in through [`RetryingSender`].

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod destination;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod receiver;
pub mod registry;
pub mod retry;
pub mod sender;

// Re-export main types
pub use config::{BusConfig, ConfigError};
pub use destination::{ChannelStats, DestinationId};
pub use dispatcher::{Dispatcher, DispatcherHandle};
pub use endpoint::ChannelEndpoint;
pub use error::{FailureKind, RegistryError, SendError};
pub use receiver::Receiver;
pub use registry::{ChannelRegistry, RoutedSender};
pub use retry::{RetryPolicy, RetryingSender};
pub use sender::{Outcome, Sender};

/// Maximum messages queued per destination before sends report `Full`.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
