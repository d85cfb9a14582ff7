//! Stock-gated order placement (application-level orchestration).
//!
//! ```text
//! OrderRequest
//!   ↓
//! 1. Build Order (fresh order number, lines copied verbatim)
//!   ↓
//! 2. Query inventory once with every sku code
//!   ↓
//! 3. Build StockIndex, evaluate the all-or-nothing check
//!   ↓                                  ↘
//! 4. Save order (atomic)            OutOfStock (nothing written, nothing published)
//!   ↓
//! 5. Publish OrderPlaced (optional, best-effort)
//! ```
//!
//! This module contains no IO itself; it composes the inventory, store, and bus
//! traits handed to it at construction time.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{Span, instrument};

use orderflow_core::OrderNumber;
use orderflow_events::{EventBus, Notification};
use orderflow_orders::{Order, OrderPlaced, OrderRequest, StockCheck, StockIndex};

use crate::inventory::{InventoryError, InventoryLookup};
use crate::order_store::{OrderStore, OrderStoreError};

pub const ORDER_PLACED_MESSAGE: &str = "Order Placed Successfully";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// Business rejection: at least one requested sku is not confirmed in stock.
    #[error("product is not in stock, please try again (unavailable: {})", sku_codes.join(", "))]
    OutOfStock { sku_codes: Vec<String> },

    /// The inventory lookup failed; the placement was abandoned.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Persisting the order failed; nothing was published.
    #[error(transparent)]
    Store(#[from] OrderStoreError),
}

/// Returned once an order is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementConfirmation {
    pub order_number: OrderNumber,
    pub line_item_count: usize,
    pub message: String,
}

#[derive(Debug)]
struct Notifier<B> {
    bus: B,
    topic: String,
}

/// Places orders against an inventory service, an order store, and (optionally)
/// a notification bus.
///
/// Concurrent placements share nothing here; the store and bus serialise
/// their own access.
#[derive(Debug)]
pub struct OrderPlacementWorkflow<L, S, B> {
    inventory: L,
    store: S,
    notifier: Option<Notifier<B>>,
}

impl<L, S, B> OrderPlacementWorkflow<L, S, B> {
    /// Workflow without notifications.
    pub fn new(inventory: L, store: S) -> Self {
        Self {
            inventory,
            store,
            notifier: None,
        }
    }

    /// Publish an `OrderPlaced` notification on `topic` after every commit.
    pub fn with_notifications(mut self, bus: B, topic: impl Into<String>) -> Self {
        self.notifier = Some(Notifier {
            bus,
            topic: topic.into(),
        });
        self
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifier.is_some()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<L, S, B> OrderPlacementWorkflow<L, S, B>
where
    L: InventoryLookup,
    S: OrderStore,
    B: EventBus<Notification<OrderPlaced>>,
{
    #[instrument(
        skip(self, request),
        fields(
            order_number = tracing::field::Empty,
            line_items = request.line_items.len()
        )
    )]
    pub async fn place_order(
        &self,
        request: OrderRequest,
    ) -> Result<PlacementConfirmation, PlacementError> {
        let order = Order::from_request(OrderNumber::generate(), request);
        Span::current().record("order_number", tracing::field::display(order.order_number()));

        let records = self.inventory.query(&order.sku_codes()).await.map_err(|e| {
            tracing::error!(error = %e, "inventory lookup failed");
            PlacementError::from(e)
        })?;

        let index = StockIndex::from_records(records).map_err(|e| {
            tracing::error!(error = %e, "inventory response rejected");
            PlacementError::Inventory(InventoryError::Malformed(e.to_string()))
        })?;

        if let StockCheck::Unavailable { sku_codes } = index.check(&order) {
            tracing::info!(unavailable = ?sku_codes, "order rejected: not in stock");
            return Err(PlacementError::OutOfStock { sku_codes });
        }

        self.store.save(&order).await.map_err(|e| {
            tracing::error!(error = %e, "failed to save order");
            PlacementError::from(e)
        })?;

        self.notify(&order);

        tracing::info!("order placed");
        Ok(PlacementConfirmation {
            order_number: order.order_number(),
            line_item_count: order.line_items().len(),
            message: ORDER_PLACED_MESSAGE.to_string(),
        })
    }

    /// Read back a committed order.
    pub async fn find_order(&self, order_number: OrderNumber) -> Result<Option<Order>, PlacementError> {
        Ok(self.store.find(order_number).await?)
    }

    // The order is already committed; a failed publish is logged, never returned.
    fn notify(&self, order: &Order) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        let message = Notification::new(
            &notifier.topic,
            Some(order.order_number().to_string()),
            OrderPlaced::for_order(order, Utc::now()),
        );

        if let Err(e) = notifier.bus.publish(message) {
            tracing::warn!(
                topic = %notifier.topic,
                error = %e,
                "order placed but notification could not be published"
            );
        }
    }
}
