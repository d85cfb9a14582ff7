use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orderflow_core::{Entity, OrderNumber, ValueObject};

/// One requested line of an incoming order.
///
/// `price` accepts a JSON number or string and is parsed without a float
/// round trip, so every digit the client sent is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItemRequest {
    pub sku_code: String,
    pub price: Decimal,
    pub quantity: i32,
}

/// Incoming order request (transient input, no identity).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(rename = "orderLineItemsDtoList", alias = "orderLineItems", default)]
    pub line_items: Vec<OrderLineItemRequest>,
}

impl OrderRequest {
    pub fn new(line_items: Vec<OrderLineItemRequest>) -> Self {
        Self { line_items }
    }
}

/// Order line: sku, unit price, quantity.
///
/// Values are carried over from the request verbatim; no positivity checks and
/// no currency normalisation happen here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub sku_code: String,
    pub price: Decimal,
    pub quantity: i32,
}

impl ValueObject for OrderLineItem {}

impl From<OrderLineItemRequest> for OrderLineItem {
    fn from(req: OrderLineItemRequest) -> Self {
        Self {
            sku_code: req.sku_code,
            price: req.price,
            quantity: req.quantity,
        }
    }
}

/// An order built from a request.
///
/// It only becomes durable once the stock check passes and a store saves it;
/// nothing in this crate mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    order_number: OrderNumber,
    line_items: Vec<OrderLineItem>,
}

impl Order {
    /// Build a fresh order, mapping each requested line 1:1 and in order.
    pub fn from_request(order_number: OrderNumber, request: OrderRequest) -> Self {
        Self {
            order_number,
            line_items: request.line_items.into_iter().map(OrderLineItem::from).collect(),
        }
    }

    /// Rebuild an order that was previously committed (used by stores).
    pub fn restore(order_number: OrderNumber, line_items: Vec<OrderLineItem>) -> Self {
        Self {
            order_number,
            line_items,
        }
    }

    pub fn order_number(&self) -> OrderNumber {
        self.order_number
    }

    pub fn line_items(&self) -> &[OrderLineItem] {
        &self.line_items
    }

    /// Sku codes of every line, in line order. Duplicates are kept.
    pub fn sku_codes(&self) -> Vec<String> {
        self.line_items.iter().map(|l| l.sku_code.clone()).collect()
    }
}

impl Entity for Order {
    type Id = OrderNumber;

    fn id(&self) -> &Self::Id {
        &self.order_number
    }
}
