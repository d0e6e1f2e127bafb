//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// A shipping destination keeps its identity while its address and item
/// assignments change; its visible ordinal does not (that is list position).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
