//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. A
/// `Price` of 450.00 equals any other `Price` of 450.00; an `Item` with the
/// same price is still a different item.
///
/// Constructors of value objects are expected to enforce their invariants
/// (e.g. a price is never negative), so holding one is proof of validity.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
