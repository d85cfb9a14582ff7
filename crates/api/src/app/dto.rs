//! Response DTOs and mapping from domain types.

use rust_decimal::Decimal;
use serde::Serialize;

use orderflow_infra::PlacementConfirmation;
use orderflow_orders::{Order, OrderLineItem};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub order_number: String,
    pub line_item_count: usize,
    pub message: String,
}

impl From<PlacementConfirmation> for PlaceOrderResponse {
    fn from(c: PlacementConfirmation) -> Self {
        Self {
            order_number: c.order_number.to_string(),
            line_item_count: c.line_item_count,
            message: c.message,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItemResponse {
    pub sku_code: String,
    pub price: Decimal,
    pub quantity: i32,
}

impl From<&OrderLineItem> for OrderLineItemResponse {
    fn from(item: &OrderLineItem) -> Self {
        Self {
            sku_code: item.sku_code.clone(),
            price: item.price,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_number: String,
    pub line_items: Vec<OrderLineItemResponse>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_number: order.order_number().to_string(),
            line_items: order.line_items().iter().map(OrderLineItemResponse::from).collect(),
        }
    }
}
