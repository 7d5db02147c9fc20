//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity and are compared by their attribute values.
/// `StockLevels { quantity: 7, min_threshold: 2, max_threshold: 20 }` is one;
/// a `StockRecord` carrying those levels is an entity.
///
/// To "modify" a value object, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
