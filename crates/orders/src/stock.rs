//! Stock evaluation: the all-or-nothing gate in front of every order commit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use orderflow_core::ValueObject;

use crate::order::Order;

/// Availability of one sku as reported by the inventory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub sku_code: String,
    pub in_stock: bool,
}

impl InventoryRecord {
    pub fn new(sku_code: impl Into<String>, in_stock: bool) -> Self {
        Self {
            sku_code: sku_code.into(),
            in_stock,
        }
    }
}

impl ValueObject for InventoryRecord {}

/// The inventory response named the same sku twice, so there is no single
/// answer for it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("inventory response lists sku code `{0}` more than once")]
pub struct DuplicateSkuCode(pub String);

/// Per-request lookup table from sku code to in-stock flag.
///
/// Fail-closed: a sku the inventory service did not mention is treated as out of stock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockIndex {
    in_stock: HashMap<String, bool>,
}

/// Outcome of checking an order against a [`StockIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockCheck {
    /// Every line is confirmed in stock.
    Available,
    /// At least one line is not; distinct sku codes in line order.
    Unavailable { sku_codes: Vec<String> },
}

impl StockCheck {
    pub fn is_available(&self) -> bool {
        matches!(self, StockCheck::Available)
    }
}

impl StockIndex {
    pub fn from_records(
        records: impl IntoIterator<Item = InventoryRecord>,
    ) -> Result<Self, DuplicateSkuCode> {
        let mut in_stock = HashMap::new();
        for record in records {
            if in_stock.insert(record.sku_code.clone(), record.in_stock).is_some() {
                return Err(DuplicateSkuCode(record.sku_code));
            }
        }
        Ok(Self { in_stock })
    }

    pub fn is_in_stock(&self, sku_code: &str) -> bool {
        self.in_stock.get(sku_code).copied().unwrap_or(false)
    }

    /// Evaluate the conjunction over every line of `order`.
    ///
    /// An order without lines is vacuously available.
    pub fn check(&self, order: &Order) -> StockCheck {
        let mut missing: Vec<String> = Vec::new();
        for item in order.line_items() {
            if !self.is_in_stock(&item.sku_code) && !missing.contains(&item.sku_code) {
                missing.push(item.sku_code.clone());
            }
        }

        if missing.is_empty() {
            StockCheck::Available
        } else {
            StockCheck::Unavailable { sku_codes: missing }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use orderflow_core::OrderNumber;

    use super::*;
    use crate::order::{OrderLineItemRequest, OrderRequest};

    fn order_of(skus: &[&str]) -> Order {
        let lines = skus
            .iter()
            .map(|s| OrderLineItemRequest {
                sku_code: s.to_string(),
                price: Decimal::new(1000, 2),
                quantity: 1,
            })
            .collect();
        Order::from_request(OrderNumber::generate(), OrderRequest::new(lines))
    }

    #[test]
    fn all_in_stock_is_available() {
        let index = StockIndex::from_records(vec![InventoryRecord::new("A1", true)]).unwrap();
        assert_eq!(index.check(&order_of(&["A1"])), StockCheck::Available);
    }

    #[test]
    fn one_out_of_stock_rejects_whole_order() {
        let index = StockIndex::from_records(vec![
            InventoryRecord::new("A1", true),
            InventoryRecord::new("B2", false),
        ])
        .unwrap();

        assert_eq!(
            index.check(&order_of(&["A1", "B2"])),
            StockCheck::Unavailable {
                sku_codes: vec!["B2".to_string()]
            }
        );
    }

    #[test]
    fn missing_sku_fails_closed() {
        let index = StockIndex::from_records(Vec::new()).unwrap();
        assert!(!index.is_in_stock("A1"));
        assert!(!index.check(&order_of(&["A1"])).is_available());
    }

    #[test]
    fn duplicate_lines_are_reported_once() {
        let index = StockIndex::from_records(vec![InventoryRecord::new("A1", false)]).unwrap();
        assert_eq!(
            index.check(&order_of(&["A1", "C3", "A1"])),
            StockCheck::Unavailable {
                sku_codes: vec!["A1".to_string(), "C3".to_string()]
            }
        );
    }

    #[test]
    fn duplicate_lines_in_stock_pass() {
        let index = StockIndex::from_records(vec![InventoryRecord::new("A1", true)]).unwrap();
        assert!(index.check(&order_of(&["A1", "A1"])).is_available());
    }

    #[test]
    fn empty_order_is_vacuously_available() {
        let index = StockIndex::default();
        assert!(index.check(&order_of(&[])).is_available());
    }

    #[test]
    fn duplicate_records_are_rejected() {
        let err = StockIndex::from_records(vec![
            InventoryRecord::new("A1", true),
            InventoryRecord::new("A1", false),
        ])
        .unwrap_err();
        assert_eq!(err, DuplicateSkuCode("A1".to_string()));
    }

    #[test]
    fn record_json_uses_camel_case() {
        let records: Vec<InventoryRecord> =
            serde_json::from_str(r#"[{"skuCode":"A1","inStock":true}]"#).unwrap();
        assert_eq!(records, vec![InventoryRecord::new("A1", true)]);
    }

    proptest! {
        #[test]
        fn available_iff_every_requested_sku_is_confirmed(
            stock in prop::collection::btree_map("[A-D][0-3]", any::<bool>(), 0..8),
            requested in prop::collection::vec("[A-D][0-3]", 0..8),
        ) {
            let index = StockIndex::from_records(
                stock.iter().map(|(sku, in_stock)| InventoryRecord::new(sku.clone(), *in_stock)),
            ).unwrap();
            let refs: Vec<&str> = requested.iter().map(String::as_str).collect();
            let check = index.check(&order_of(&refs));

            let expected = requested.iter().all(|s| stock.get(s) == Some(&true));
            prop_assert_eq!(check.is_available(), expected);
        }

        #[test]
        fn unknown_sku_always_rejects(
            stock in prop::collection::btree_map("[A-D][0-3]", any::<bool>(), 0..8),
            requested in prop::collection::vec("[A-D][0-3]", 0..8),
        ) {
            let index = StockIndex::from_records(
                stock.iter().map(|(sku, in_stock)| InventoryRecord::new(sku.clone(), *in_stock)),
            ).unwrap();
            let mut refs: Vec<&str> = requested.iter().map(String::as_str).collect();
            refs.push("Z9");

            match index.check(&order_of(&refs)) {
                StockCheck::Unavailable { sku_codes } => {
                    prop_assert!(sku_codes.contains(&"Z9".to_string()));
                }
                StockCheck::Available => prop_assert!(false, "unknown sku must not pass"),
            }
        }

        #[test]
        fn unavailable_list_is_exactly_the_failing_distinct_skus(
            stock in prop::collection::btree_map("[A-D][0-3]", any::<bool>(), 0..8),
            requested in prop::collection::vec("[A-D][0-3]", 1..8),
        ) {
            let index = StockIndex::from_records(
                stock.iter().map(|(sku, in_stock)| InventoryRecord::new(sku.clone(), *in_stock)),
            ).unwrap();
            let refs: Vec<&str> = requested.iter().map(String::as_str).collect();

            let failing: BTreeMap<&str, ()> = requested
                .iter()
                .filter(|s| stock.get(*s) != Some(&true))
                .map(|s| (s.as_str(), ()))
                .collect();

            match index.check(&order_of(&refs)) {
                StockCheck::Available => prop_assert!(failing.is_empty()),
                StockCheck::Unavailable { sku_codes } => {
                    prop_assert_eq!(sku_codes.len(), failing.len());
                    for sku in &sku_codes {
                        prop_assert!(failing.contains_key(sku.as_str()));
                    }
                }
            }
        }
    }
}
