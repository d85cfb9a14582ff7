//! Infrastructure layer: inventory client, order storage, notification transport,
//! configuration, and the placement workflow that composes them.

pub mod config;
pub mod event_bus;
pub mod inventory;
pub mod order_store;
pub mod placement;

pub use config::{ConfigError, InventoryEndpoint, ServiceConfig};
pub use inventory::{HttpInventoryClient, InventoryError, InventoryLookup};
pub use order_store::{InMemoryOrderStore, OrderStore, OrderStoreError, PostgresOrderStore};
pub use placement::{OrderPlacementWorkflow, PlacementConfirmation, PlacementError};
