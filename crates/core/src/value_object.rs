//! Value object trait: equality by value, not identity.
//!
//! Candidate unit values, derived item financials and balance rollups are value
//! objects: they are recomputed wholesale and replaced, never edited in place.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct BalanceLine {
///     total: Decimal,
///     count: usize,
/// }
///
/// impl ValueObject for BalanceLine {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
