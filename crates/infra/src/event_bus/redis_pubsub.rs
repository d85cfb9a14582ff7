//! Redis pub/sub-backed notification bus (optional).
//!
//! Redis pub/sub is not durable: subscribers that are offline when an order is
//! placed never see its notification. That matches the fire-and-forget contract
//! of order notifications.
//!
//! `publish` never waits on Redis. The encoded notification is handed to a
//! detached task on the current tokio runtime, which shares one multiplexed
//! connection and gives up after `publish_timeout`. Failures past that point are
//! logged, not returned.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::OnceCell;

use orderflow_events::{EventBus, Notification};

#[derive(Debug, Error)]
pub enum RedisBusError {
    #[error("redis error: {0}")]
    Redis(String),
    #[error("failed to serialize notification: {0}")]
    Serialize(String),
    #[error("no tokio runtime to deliver the notification on")]
    NoRuntime,
}

/// Redis pub/sub bus for JSON notifications.
///
/// Each notification is published on its own topic (channel = topic).
pub struct RedisPubSubEventBus<E> {
    client: redis::Client,
    connection: Arc<OnceCell<MultiplexedConnection>>,
    publish_timeout: Duration,
    _payload: PhantomData<fn() -> E>,
}

impl<E> RedisPubSubEventBus<E> {
    /// Parses the URL only; the connection is opened by the first publish.
    pub fn new(redis_url: impl AsRef<str>, publish_timeout: Duration) -> Result<Self, RedisBusError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| RedisBusError::Redis(e.to_string()))?;
        Ok(Self {
            client,
            connection: Arc::new(OnceCell::new()),
            publish_timeout,
            _payload: PhantomData,
        })
    }
}

impl<E> fmt::Debug for RedisPubSubEventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisPubSubEventBus")
            .field("client", &self.client)
            .field("connected", &self.connection.initialized())
            .field("publish_timeout", &self.publish_timeout)
            .finish()
    }
}

/// Wire payload: the whole envelope as JSON.
pub(crate) fn encode<E: Serialize>(message: &Notification<E>) -> Result<String, RedisBusError> {
    serde_json::to_string(message).map_err(|e| RedisBusError::Serialize(e.to_string()))
}

async fn deliver(
    client: &redis::Client,
    connection: &OnceCell<MultiplexedConnection>,
    topic: &str,
    payload: String,
) -> redis::RedisResult<i64> {
    let mut conn = connection
        .get_or_try_init(|| client.get_multiplexed_tokio_connection())
        .await?
        .clone();
    conn.publish(topic, payload).await
}

impl<E> EventBus<Notification<E>> for RedisPubSubEventBus<E>
where
    E: Serialize + Send + 'static,
{
    type Error = RedisBusError;

    fn publish(&self, message: Notification<E>) -> Result<(), Self::Error> {
        let payload = encode(&message)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| RedisBusError::NoRuntime)?;

        let client = self.client.clone();
        let connection = Arc::clone(&self.connection);
        let topic = message.topic().to_string();
        let timeout = self.publish_timeout;

        runtime.spawn(async move {
            match tokio::time::timeout(timeout, deliver(&client, &connection, &topic, payload)).await {
                Ok(Ok(receivers)) => tracing::debug!(%topic, receivers, "notification published"),
                Ok(Err(e)) => tracing::warn!(%topic, error = %e, "notification could not be published"),
                Err(_) => tracing::warn!(
                    %topic,
                    timeout_ms = timeout.as_millis() as u64,
                    "notification publish timed out"
                ),
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use chrono::Utc;

    use orderflow_core::OrderNumber;
    use orderflow_orders::{Order, OrderPlaced, OrderRequest};

    use super::*;

    fn placed() -> Notification<OrderPlaced> {
        let order = Order::from_request(OrderNumber::generate(), OrderRequest::default());
        Notification::new(
            "notificationTopic",
            Some(order.order_number().to_string()),
            OrderPlaced::for_order(&order, Utc::now()),
        )
    }

    /// Accepts connections and never answers.
    async fn stalled_redis() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("redis://{addr}")
    }

    #[test]
    fn payload_is_the_envelope_json() {
        let message = placed();
        let payload = encode(&message).unwrap();

        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(json["topic"], "notificationTopic");
        assert_eq!(json["eventType"], "orders.order.placed");
        assert_eq!(json["payload"]["orderNumber"], message.payload().order_number.to_string());

        let decoded: Notification<OrderPlaced> = serde_json::from_str(&payload).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn publish_without_a_runtime_is_an_error() {
        let bus = RedisPubSubEventBus::<OrderPlaced>::new("redis://127.0.0.1:1", Duration::from_millis(50)).unwrap();
        let err = bus.publish(placed()).unwrap_err();
        assert!(matches!(err, RedisBusError::NoRuntime));
    }

    #[tokio::test]
    async fn stalled_redis_does_not_hold_up_publish() {
        let url = stalled_redis().await;
        let bus = RedisPubSubEventBus::<OrderPlaced>::new(url, Duration::from_millis(100)).unwrap();

        let started = Instant::now();
        bus.publish(placed()).unwrap();
        bus.publish(placed()).unwrap();
        assert!(started.elapsed() < Duration::from_millis(500));

        // Let the delivery tasks run into their timeout.
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn publishes_on_the_notification_topic() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let message = placed();
        let topic = format!("orders-test-{}", message.payload().order_number);
        let message = Notification::new(topic.clone(), message.key().map(str::to_string), message.payload().clone());

        let client = redis::Client::open(url.as_str()).unwrap();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let subscribed = topic.clone();
        let listener = std::thread::spawn(move || {
            let mut conn = client.get_connection().unwrap();
            let mut pubsub = conn.as_pubsub();
            pubsub.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
            pubsub.subscribe(&subscribed).unwrap();
            ready_tx.send(()).unwrap();
            let msg = pubsub.get_message().unwrap();
            (msg.get_channel_name().to_string(), msg.get_payload::<String>().unwrap())
        });
        ready_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let bus = RedisPubSubEventBus::<OrderPlaced>::new(&url, Duration::from_secs(2)).unwrap();
        bus.publish(message.clone()).unwrap();

        let (channel, payload) = tokio::task::spawn_blocking(move || listener.join().unwrap())
            .await
            .unwrap();
        assert_eq!(channel, topic);
        let decoded: Notification<OrderPlaced> = serde_json::from_str(&payload).unwrap();
        assert_eq!(decoded, message);
    }
}
