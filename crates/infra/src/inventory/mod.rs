//! Inventory lookup: the one external read the placement workflow depends on.

pub mod discovery;
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use orderflow_orders::InventoryRecord;

pub use discovery::{ServiceRegistry, StaticServiceRegistry};
pub use http::HttpInventoryClient;

/// Inventory lookup failures. None of these are retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// The inventory service address could not be resolved.
    #[error("cannot resolve inventory service: {0}")]
    Resolve(String),

    /// Connection, timeout, or other transport failure.
    #[error("inventory request failed: {0}")]
    Transport(String),

    /// The inventory service answered with a non-success status.
    #[error("inventory service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("inventory response could not be decoded: {0}")]
    Decode(String),

    /// The response decoded but is not usable (e.g. ambiguous records).
    #[error("inventory response is malformed: {0}")]
    Malformed(String),
}

/// Stock availability source.
///
/// Implementations are called exactly once per placement, with every requested
/// sku code (duplicates included, in line order).
#[async_trait]
pub trait InventoryLookup: Send + Sync {
    async fn query(&self, sku_codes: &[String]) -> Result<Vec<InventoryRecord>, InventoryError>;
}

#[async_trait]
impl<L> InventoryLookup for Arc<L>
where
    L: InventoryLookup + ?Sized,
{
    async fn query(&self, sku_codes: &[String]) -> Result<Vec<InventoryRecord>, InventoryError> {
        (**self).query(sku_codes).await
    }
}
