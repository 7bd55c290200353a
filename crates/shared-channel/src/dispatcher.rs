//! # Dispatcher
//!
//! The execution context receivers run on.
//!
//! Each destination is registered against exactly one dispatcher. Endpoints
//! only enqueue; the dispatcher drains the queues and hands every message to
//! its receiver. It can be pumped by hand with
//! [`Dispatcher::dispatch_queued_events`] or driven as a task with
//! [`Dispatcher::run`].

use crate::destination::{DestinationId, Registration};
use crate::receiver::Receiver;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::sync::{watch, Notify};
use tracing::{debug, info};

/// Type-erased drain side of one channel.
trait Pump: Send {
    fn destination(&self) -> &DestinationId;

    /// Delivers everything currently queued. Returns the number delivered.
    fn drain(&mut self) -> usize;

    /// Whether the channel has been closed out and can be dropped.
    fn is_finished(&self) -> bool;
}

struct ChannelPump<T> {
    registration: Arc<Registration>,
    queue: mpsc::Receiver<T>,
    receiver: Box<dyn Receiver<T>>,
    finished: bool,
}

impl<T: Send> Pump for ChannelPump<T> {
    fn destination(&self) -> &DestinationId {
        self.registration.destination()
    }

    fn drain(&mut self) -> usize {
        // Close before draining so nothing can land after the final drain.
        let revoked = !self.registration.is_live();
        if revoked {
            self.queue.close();
        }

        let mut delivered = 0;
        loop {
            match self.queue.try_recv() {
                Ok(message) => {
                    self.receiver.on_receive(message);
                    delivered += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    break;
                }
            }
        }

        if revoked {
            self.finished = true;
        }
        if delivered > 0 {
            self.registration.record_delivered(delivered as u64);
        }
        delivered
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Cloneable handle used to register destinations on a [`Dispatcher`].
#[derive(Clone)]
pub struct DispatcherHandle {
    attach: mpsc::UnboundedSender<Box<dyn Pump>>,
    wake: Arc<Notify>,
}

impl DispatcherHandle {
    pub(crate) fn wake(&self) -> Arc<Notify> {
        self.wake.clone()
    }

    /// Hands a new channel to the dispatcher.
    ///
    /// Returns `false` if the dispatcher has been dropped.
    pub(crate) fn attach<T: Send + 'static>(
        &self,
        registration: Arc<Registration>,
        queue: mpsc::Receiver<T>,
        receiver: Box<dyn Receiver<T>>,
    ) -> bool {
        let pump = ChannelPump {
            registration,
            queue,
            receiver,
            finished: false,
        };
        if self.attach.send(Box::new(pump)).is_err() {
            return false;
        }
        self.wake.notify_one();
        true
    }

    /// Whether the dispatcher behind this handle still exists.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.attach.is_closed()
    }
}

/// Runs receivers for every destination registered against it.
///
/// Dropping the dispatcher tears down all of its destinations: subsequent
/// sends on their endpoints fail with `SendError::Disconnected`.
pub struct Dispatcher {
    pumps: Vec<Box<dyn Pump>>,
    attach_rx: mpsc::UnboundedReceiver<Box<dyn Pump>>,
    handle: DispatcherHandle,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        let (attach, attach_rx) = mpsc::unbounded_channel();
        Self {
            pumps: Vec::new(),
            attach_rx,
            handle: DispatcherHandle {
                attach,
                wake: Arc::new(Notify::new()),
            },
        }
    }

    /// Handle for registering destinations on this dispatcher.
    #[must_use]
    pub fn handle(&self) -> DispatcherHandle {
        self.handle.clone()
    }

    /// Number of channels currently attached.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.pumps.len()
    }

    /// Delivers every queued message to its receiver.
    ///
    /// Channels are drained in registration order, each in FIFO order.
    /// Channels whose destination was deregistered get a final drain (messages
    /// accepted before deregistration are still delivered) and are dropped.
    ///
    /// Returns the number of messages delivered.
    pub fn dispatch_queued_events(&mut self) -> usize {
        while let Ok(pump) = self.attach_rx.try_recv() {
            debug!(destination = %pump.destination(), "Channel attached");
            self.pumps.push(pump);
        }

        let mut delivered = 0;
        for pump in &mut self.pumps {
            delivered += pump.drain();
        }

        self.pumps.retain(|pump| {
            if pump.is_finished() {
                debug!(destination = %pump.destination(), "Channel closed");
                false
            } else {
                true
            }
        });

        delivered
    }

    /// Dispatches until `shutdown` turns `true` or its sender is dropped.
    ///
    /// Sleeps between rounds until an endpoint enqueues a message or a new
    /// channel is attached. Queued messages are drained once more before
    /// returning.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("Dispatcher started");
        let wake = self.handle.wake();

        loop {
            self.dispatch_queued_events();

            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = wake.notified() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        let delivered = self.dispatch_queued_events();
        info!(final_drain = delivered, "Dispatcher stopped");
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
