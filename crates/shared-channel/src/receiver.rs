//! # Receiver
//!
//! The consuming side of a channel.

/// The receiving end of a message channel.
///
/// Receivers are pushed messages by the [`Dispatcher`](crate::Dispatcher)
/// they were registered on, always from that dispatcher's execution context,
/// one message at a time and in arrival order. `on_receive` should not block.
pub trait Receiver<T>: Send {
    fn on_receive(&mut self, message: T);
}

impl<T, F> Receiver<T> for F
where
    F: FnMut(T) + Send,
{
    fn on_receive(&mut self, message: T) {
        self(message)
    }
}
