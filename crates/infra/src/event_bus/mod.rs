//! Infrastructure event bus implementations.
//!
//! The bus abstraction lives in `orderflow-events` as pure mechanics. This
//! module provides infrastructure-backed implementations (e.g. Redis).

#[cfg(feature = "redis")]
pub mod redis_pubsub;

#[cfg(feature = "redis")]
pub use redis_pubsub::{RedisBusError, RedisPubSubEventBus};
