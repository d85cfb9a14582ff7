use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderflow_core::OrderNumber;
use orderflow_events::Event;

use crate::order::Order;

/// Event: OrderPlaced.
///
/// Emitted only after the order has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPlaced {
    pub order_number: OrderNumber,
    pub occurred_at: DateTime<Utc>,
}

impl OrderPlaced {
    pub fn for_order(order: &Order, occurred_at: DateTime<Utc>) -> Self {
        Self {
            order_number: order.order_number(),
            occurred_at,
        }
    }
}

impl Event for OrderPlaced {
    fn event_type(&self) -> &'static str {
        "orders.order.placed"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderRequest;

    #[test]
    fn carries_the_order_number() {
        let order = Order::from_request(OrderNumber::generate(), OrderRequest::default());
        let at = Utc::now();
        let event = OrderPlaced::for_order(&order, at);

        assert_eq!(event.order_number, order.order_number());
        assert_eq!(event.occurred_at(), at);
        assert_eq!(event.event_type(), "orders.order.placed");
    }

    #[test]
    fn json_shape_is_camel_case() {
        let order = Order::from_request(OrderNumber::generate(), OrderRequest::default());
        let json = serde_json::to_value(OrderPlaced::for_order(&order, Utc::now())).unwrap();
        assert_eq!(json["orderNumber"], order.order_number().to_string());
        assert!(json.get("occurredAt").is_some());
    }
}
