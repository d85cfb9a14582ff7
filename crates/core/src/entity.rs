//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// An order is an entity (identified by its order number); its line items are not.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
