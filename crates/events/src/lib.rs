//! Integration events and the transport-agnostic bus they travel on.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::Notification;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
