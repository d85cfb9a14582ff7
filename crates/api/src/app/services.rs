use std::sync::Arc;

use anyhow::Context;

use orderflow_core::OrderNumber;
use orderflow_events::{InMemoryEventBus, Notification, Subscription};
use orderflow_infra::{
    HttpInventoryClient, InMemoryOrderStore, OrderPlacementWorkflow, PlacementConfirmation, PlacementError,
    ServiceConfig,
};
use orderflow_orders::{Order, OrderPlaced, OrderRequest};

#[cfg(feature = "redis")]
use orderflow_infra::{PostgresOrderStore, event_bus::RedisPubSubEventBus};

type InMemoryBus = InMemoryEventBus<Notification<OrderPlaced>>;

type InMemoryWorkflow = OrderPlacementWorkflow<HttpInventoryClient, Arc<InMemoryOrderStore>, Arc<InMemoryBus>>;

#[cfg(feature = "redis")]
type PersistentBus = RedisPubSubEventBus<OrderPlaced>;

#[cfg(feature = "redis")]
type PersistentWorkflow =
    OrderPlacementWorkflow<HttpInventoryClient, Arc<PostgresOrderStore>, Arc<PersistentBus>>;

#[derive(Debug, Clone)]
pub enum AppServices {
    InMemory {
        workflow: Arc<InMemoryWorkflow>,
        bus: Arc<InMemoryBus>,
    },
    #[cfg(feature = "redis")]
    Persistent { workflow: Arc<PersistentWorkflow> },
}

impl AppServices {
    pub async fn build(config: &ServiceConfig) -> anyhow::Result<Self> {
        if config.use_persistent_stores {
            #[cfg(feature = "redis")]
            {
                return Self::persistent(config).await;
            }
            #[cfg(not(feature = "redis"))]
            {
                tracing::warn!(
                    "USE_PERSISTENT_STORES=true but redis feature not enabled, falling back to in-memory"
                );
            }
        }

        Self::in_memory(config)
    }

    /// In-memory wiring (dev/test): orders live for the lifetime of the process.
    pub fn in_memory(config: &ServiceConfig) -> anyhow::Result<Self> {
        let inventory = HttpInventoryClient::from_config(config).context("failed to build inventory client")?;
        let store = Arc::new(InMemoryOrderStore::new());
        let bus: Arc<InMemoryBus> = Arc::new(InMemoryEventBus::new());

        let mut workflow = OrderPlacementWorkflow::new(inventory, store);
        if config.notifications_enabled {
            workflow = workflow.with_notifications(bus.clone(), config.notification_topic.clone());
        }

        tracing::info!(
            notifications = config.notifications_enabled,
            "order services wired (in-memory)"
        );

        Ok(AppServices::InMemory {
            workflow: Arc::new(workflow),
            bus,
        })
    }

    #[cfg(feature = "redis")]
    async fn persistent(config: &ServiceConfig) -> anyhow::Result<Self> {
        let database_url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")?;

        let inventory = HttpInventoryClient::from_config(config).context("failed to build inventory client")?;

        let store = PostgresOrderStore::connect(database_url)
            .await
            .context("failed to connect to Postgres")?;
        store.migrate().await.context("failed to create order tables")?;

        let mut workflow = OrderPlacementWorkflow::new(inventory, Arc::new(store));
        if config.notifications_enabled {
            let bus = RedisPubSubEventBus::new(&config.redis_url, config.notification_timeout)
                .context("failed to create Redis pub/sub bus")?;
            workflow = workflow.with_notifications(Arc::new(bus), config.notification_topic.clone());
        }

        tracing::info!(
            notifications = config.notifications_enabled,
            "order services wired (postgres + redis)"
        );

        Ok(AppServices::Persistent {
            workflow: Arc::new(workflow),
        })
    }

    pub async fn place_order(&self, request: OrderRequest) -> Result<PlacementConfirmation, PlacementError> {
        match self {
            AppServices::InMemory { workflow, .. } => workflow.place_order(request).await,
            #[cfg(feature = "redis")]
            AppServices::Persistent { workflow, .. } => workflow.place_order(request).await,
        }
    }

    pub async fn find_order(&self, order_number: OrderNumber) -> Result<Option<Order>, PlacementError> {
        match self {
            AppServices::InMemory { workflow, .. } => workflow.find_order(order_number).await,
            #[cfg(feature = "redis")]
            AppServices::Persistent { workflow, .. } => workflow.find_order(order_number).await,
        }
    }

    /// Listen to in-process notifications. `None` when notifications leave the
    /// process (Redis); subscribe on the Redis topic instead.
    pub fn subscribe_notifications(&self) -> Option<Subscription<Notification<OrderPlaced>>> {
        match self {
            AppServices::InMemory { bus, .. } => Some(bus.subscribe()),
            #[cfg(feature = "redis")]
            AppServices::Persistent { .. } => None,
        }
    }
}
