//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Every record kind the warehouse keeps is an entity keyed by an immutable
/// identifier; edits replace the other fields and never the id.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Ord + core::hash::Hash + core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    /// Human-readable kind, used in error messages and log fields.
    const KIND: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
