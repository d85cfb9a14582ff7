//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity of their own and are compared by their
/// attribute values. Order line items and inventory records are value objects:
/// two line items with the same sku, price and quantity are interchangeable,
/// which is why duplicate lines in a request are kept as separate values rather
/// than merged.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Money {
///     amount: i64,
///     currency: String,
/// }
///
/// impl ValueObject for Money {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
