//! HTTP inventory client.
//!
//! Issues `GET {base}/api/inventory?skuCodes=a,b,c` and decodes a JSON array of
//! `{"skuCode": ..., "inStock": ...}` records.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use orderflow_orders::InventoryRecord;

use super::discovery::{ServiceRegistry, StaticServiceRegistry};
use super::{InventoryError, InventoryLookup};
use crate::config::{InventoryEndpoint, ServiceConfig};

const INVENTORY_PATH: &str = "/api/inventory";

#[derive(Debug, Clone)]
enum Target {
    Fixed(String),
    Discovered {
        service_name: String,
        registry: Arc<dyn ServiceRegistry>,
    },
}

/// `reqwest`-backed [`InventoryLookup`].
#[derive(Debug, Clone)]
pub struct HttpInventoryClient {
    client: reqwest::Client,
    target: Target,
}

impl HttpInventoryClient {
    /// Client for an inventory service at a fixed base URL.
    pub fn fixed(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, InventoryError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client: build_client(timeout)?,
            target: Target::Fixed(base_url),
        })
    }

    /// Client that resolves `service_name` through `registry` on every call.
    pub fn discovered(
        service_name: impl Into<String>,
        registry: Arc<dyn ServiceRegistry>,
        timeout: Option<Duration>,
    ) -> Result<Self, InventoryError> {
        Ok(Self {
            client: build_client(timeout)?,
            target: Target::Discovered {
                service_name: service_name.into(),
                registry,
            },
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, InventoryError> {
        match &config.inventory {
            InventoryEndpoint::Fixed { base_url } => Self::fixed(base_url.clone(), config.inventory_timeout),
            InventoryEndpoint::Discovered { service_name } => {
                let registry = StaticServiceRegistry::new(config.service_registry.clone());
                if !registry.contains(service_name) {
                    tracing::warn!(
                        service = %service_name,
                        "inventory service is not in the service registry; placements will fail until it is"
                    );
                }
                Self::discovered(service_name.clone(), Arc::new(registry), config.inventory_timeout)
            }
        }
    }

    fn base_url(&self) -> Result<String, InventoryError> {
        match &self.target {
            Target::Fixed(url) => Ok(url.clone()),
            Target::Discovered {
                service_name,
                registry,
            } => registry
                .resolve(service_name)
                .map(|u| u.trim_end_matches('/').to_string())
                .ok_or_else(|| InventoryError::Resolve(format!("no instance registered for `{service_name}`"))),
        }
    }
}

fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, InventoryError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| InventoryError::Transport(format!("failed to create HTTP client: {e}")))
}

#[async_trait]
impl InventoryLookup for HttpInventoryClient {
    #[instrument(skip(self, sku_codes), fields(sku_count = sku_codes.len()), err)]
    async fn query(&self, sku_codes: &[String]) -> Result<Vec<InventoryRecord>, InventoryError> {
        let url = format!("{}{}", self.base_url()?, INVENTORY_PATH);
        let joined = sku_codes.join(",");

        let resp = self
            .client
            .get(&url)
            .query(&[("skuCodes", joined.as_str())])
            .send()
            .await
            .map_err(|e| InventoryError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(InventoryError::Status {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }

        let records: Vec<InventoryRecord> = resp
            .json()
            .await
            .map_err(|e| InventoryError::Decode(e.to_string()))?;

        tracing::debug!(records = records.len(), "inventory answered");
        Ok(records)
    }
}
