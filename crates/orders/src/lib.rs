//! Orders domain module.
//!
//! This crate contains the business rules for placing orders, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage). Talking to the
//! inventory service and persisting orders is wired up in `orderflow-infra`.

pub mod event;
pub mod order;
pub mod stock;

pub use event::OrderPlaced;
pub use order::{Order, OrderLineItem, OrderLineItemRequest, OrderRequest};
pub use stock::{DuplicateSkuCode, InventoryRecord, StockCheck, StockIndex};
