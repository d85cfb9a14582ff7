//! Order persistence.
//!
//! The placement workflow only ever saves an order after its stock check passed;
//! `find` exists so committed orders can be read back.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use orderflow_core::OrderNumber;
use orderflow_orders::Order;

pub use in_memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderStoreError {
    /// An order with this number was already committed.
    #[error("order {0} already exists")]
    Duplicate(OrderNumber),

    /// The backing database failed.
    #[error("database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// A stored row could not be mapped back into an order.
    #[error("stored order is corrupt: {0}")]
    Corrupt(String),

    /// Internal lock poisoning (in-memory store).
    #[error("order store lock poisoned")]
    Poisoned,
}

/// Durable home of committed orders.
///
/// `save` must be atomic per order: either the order and all of its lines are
/// stored, or nothing is.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn save(&self, order: &Order) -> Result<(), OrderStoreError>;

    async fn find(&self, order_number: OrderNumber) -> Result<Option<Order>, OrderStoreError>;
}

#[async_trait]
impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    async fn save(&self, order: &Order) -> Result<(), OrderStoreError> {
        (**self).save(order).await
    }

    async fn find(&self, order_number: OrderNumber) -> Result<Option<Order>, OrderStoreError> {
        (**self).find(order_number).await
    }
}
