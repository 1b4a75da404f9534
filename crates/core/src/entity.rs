//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Catalog items keep their identity across edits and stock movements;
/// purchases keep theirs forever (they are never mutated).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
