//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Both persisted records (suppliers, user accounts) implement this so that
/// stores and error messages can talk about "the thing with this id" without
/// knowing the concrete type.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Human-readable entity name used in logs and error messages.
    const NAME: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
