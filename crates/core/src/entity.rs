//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Process items, linkages and invoices are entities: two snapshots with the
/// same id describe the same thing at different moments.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
