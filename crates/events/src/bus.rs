//! Event publishing/subscription abstraction (mechanics only).
//!
//! This module provides the **event bus pattern** - a pub/sub mechanism for
//! distributing notifications to whoever listens (mail senders, analytics,
//! other services).
//!
//! ## Design Philosophy
//!
//! The event bus is intentionally **lightweight** and makes minimal assumptions:
//!
//! - **Transport-agnostic**: Works with in-memory channels, Redis pub/sub, message queues, etc.
//! - **Fire-and-forget**: Publishing never waits for consumers to process a message
//! - **No persistence**: The bus is for distribution, not storage (the order store is
//!   the source of truth)

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to an event stream.
///
/// Each subscription gets a copy of all messages published to the bus
/// (broadcast semantics).
///
/// ```ignore
/// let subscription = bus.subscribe();
///
/// loop {
///     match subscription.recv_timeout(Duration::from_secs(1)) {
///         Ok(message) => handle(message),
///         Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
///         Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
///     }
/// }
/// ```
///
/// Subscriptions are designed for single-threaded consumption.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// In this service the bus is the notification publisher: after an order is
/// committed, an `OrderPlaced` notification is handed to `publish()`.
///
/// ```text
/// place_order → OrderStore (save) → EventBus (publish) → Consumers
/// ```
///
/// Orders are **stored first**, then **published**. A failed publish never
/// undoes a committed order; callers decide whether to surface or log it.
///
/// `publish` is called from request tasks and must return promptly: transports
/// with network round trips hand delivery off instead of waiting for it.
///
/// The trait requires `Send + Sync`; multiple request tasks publish concurrently.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }
}
