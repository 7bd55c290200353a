//! # Retrying Sender
//!
//! Opt-in decorator that re-attempts transient delivery failures.
//! Endpoints themselves never retry.

use crate::error::SendError;
use crate::sender::{Outcome, Sender};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// How many times, and how far apart, a failed send is re-attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,

    /// Pause between attempts.
    #[serde(
        rename = "backoff_ms",
        serialize_with = "serialize_millis",
        deserialize_with = "deserialize_millis"
    )]
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Single attempt, no retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(10),
        }
    }
}

fn serialize_millis<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

fn deserialize_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}

/// Wraps a [`Sender`] and re-sends on retryable failures.
///
/// Only failures for which [`SendError::is_retryable`](crate::SendError::is_retryable)
/// holds are re-attempted; registration failures and rejections return at
/// once. The last failure is returned unchanged. Each attempt sends a clone
/// of the message.
///
/// ## Blocking vs async
///
/// The [`Sender`] impl sleeps the calling thread for `backoff` between
/// attempts, blocking for up to `(max_attempts - 1) * backoff`. Use it from
/// plain threads or `spawn_blocking` only: on a tokio worker the sleep also
/// stalls the dispatcher task that would free queue space. From async code
/// use [`RetryingSender::send_async`], which awaits the backoff instead.
pub struct RetryingSender<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> RetryingSender<S> {
    #[must_use]
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Whether `error` on attempt number `attempt` should be re-attempted.
    fn should_retry(&self, error: &SendError, attempt: u32) -> bool {
        let attempts = self.policy.max_attempts.max(1);
        if !error.is_retryable() || attempt >= attempts {
            return false;
        }
        debug!(
            destination = %error.destination(),
            attempt,
            max_attempts = attempts,
            error = %error,
            "Retrying send"
        );
        true
    }

    /// Like [`Sender::send`], but yields to the runtime between attempts.
    ///
    /// # Errors
    ///
    /// The last failure once retries are exhausted, or the first
    /// non-retryable failure.
    pub async fn send_async<T>(&self, message: T) -> Outcome
    where
        T: Clone,
        S: Sender<T>,
    {
        let mut attempt = 1;
        loop {
            match self.inner.send(message.clone()) {
                Ok(()) => return Ok(()),
                Err(error) if !self.should_retry(&error, attempt) => return Err(error),
                Err(_) => {}
            }
            if self.policy.backoff.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.policy.backoff).await;
            }
            attempt += 1;
        }
    }
}

impl<T, S> Sender<T> for RetryingSender<S>
where
    T: Clone,
    S: Sender<T>,
{
    fn send(&self, message: T) -> Outcome {
        let mut attempt = 1;

        loop {
            match self.inner.send(message.clone()) {
                Ok(()) => return Ok(()),
                Err(error) if !self.should_retry(&error, attempt) => return Err(error),
                Err(_) => {}
            }
            if !self.policy.backoff.is_zero() {
                thread::sleep(self.policy.backoff);
            }
            attempt += 1;
        }
    }
}
