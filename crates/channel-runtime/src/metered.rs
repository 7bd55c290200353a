//! Decorators that count channel traffic.
//!
//! Both wrap the shared-channel traits without changing what they return,
//! so they can sit around any endpoint or receiver.

use channel_telemetry::{record_delivered, record_send, time_send};
use shared_channel::{DestinationId, Outcome, Receiver, Sender};

/// Records every send outcome under the destination's label.
pub struct MeteredSender<S> {
    inner: S,
    destination: DestinationId,
}

impl<S> MeteredSender<S> {
    pub fn new(inner: S, destination: DestinationId) -> Self {
        Self { inner, destination }
    }

    pub fn destination(&self) -> &DestinationId {
        &self.destination
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<T, S: Sender<T>> Sender<T> for MeteredSender<S> {
    fn send(&self, message: T) -> Outcome {
        let _timer = time_send!();
        let outcome = self.inner.send(message);
        let kind = outcome.as_ref().err().map(|e| e.kind().as_str());
        record_send(self.destination.as_str(), kind);
        outcome
    }
}

/// Counts messages handed to the wrapped receiver.
pub struct MeteredReceiver<R> {
    inner: R,
    destination: DestinationId,
}

impl<R> MeteredReceiver<R> {
    pub fn new(inner: R, destination: DestinationId) -> Self {
        Self { inner, destination }
    }
}

impl<T, R: Receiver<T>> Receiver<T> for MeteredReceiver<R> {
    fn on_receive(&mut self, message: T) {
        self.inner.on_receive(message);
        record_delivered(self.destination.as_str(), 1);
    }
}
