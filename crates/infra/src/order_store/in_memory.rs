use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use orderflow_core::OrderNumber;
use orderflow_orders::Order;

use super::{OrderStore, OrderStoreError};

/// In-memory order store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    inner: RwLock<HashMap<OrderNumber, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed orders.
    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn save(&self, order: &Order) -> Result<(), OrderStoreError> {
        let mut map = self.inner.write().map_err(|_| OrderStoreError::Poisoned)?;
        if map.contains_key(&order.order_number()) {
            return Err(OrderStoreError::Duplicate(order.order_number()));
        }
        map.insert(order.order_number(), order.clone());
        Ok(())
    }

    async fn find(&self, order_number: OrderNumber) -> Result<Option<Order>, OrderStoreError> {
        let map = self.inner.read().map_err(|_| OrderStoreError::Poisoned)?;
        Ok(map.get(&order_number).cloned())
    }
}
