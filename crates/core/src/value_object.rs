//! Value object trait: equality by value, not identity.
//!
//! Money amounts and scopes are value objects: two scopes naming the same
//! channel, store and SKU are the same scope.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one. Implementors must be cheap enough to clone, comparable and
/// debuggable (they show up in log fields and test assertions).
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Money {
///     vat: String,
///     non_vat: String,
/// }
///
/// impl ValueObject for Money {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
