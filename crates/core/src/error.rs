//! Pricing error model.

use thiserror::Error;

/// Result type used across the pricing engine.
pub type PricingResult<T> = Result<T, PricingError>;

/// Engine-level error.
///
/// Caller-input failures (`InvalidScope`, `InvalidPrice`, `EmptyUpdate`,
/// `InvalidExpiry`) are reported synchronously and never retried. `NotFound` is
/// a normal read outcome. `Storage` carries a lower-layer fault through
/// unchanged; the engine cannot repair a broken store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Store or SKU missing/blank, or a blank channel name.
    #[error("invalid scope: {0}")]
    InvalidScope(String),

    /// A money component was negative or not a decimal number.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// An update carried none of the three price fields.
    #[error("update carries no price")]
    EmptyUpdate,

    /// Special price end time missing or not in the future.
    #[error("invalid expiry: {0}")]
    InvalidExpiry(String),

    /// No live normal price exists for the requested scope chain.
    #[error("not found")]
    NotFound,

    /// Opaque failure from the fact store.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl PricingError {
    pub fn invalid_scope(msg: impl Into<String>) -> Self {
        Self::InvalidScope(msg.into())
    }

    pub fn invalid_price(msg: impl Into<String>) -> Self {
        Self::InvalidPrice(msg.into())
    }

    pub fn invalid_expiry(msg: impl Into<String>) -> Self {
        Self::InvalidExpiry(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// True for errors caused by the caller's input (as opposed to read misses
    /// or storage faults).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidScope(_) | Self::InvalidPrice(_) | Self::EmptyUpdate | Self::InvalidExpiry(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_client_errors() {
        assert!(PricingError::invalid_scope("store").is_client_error());
        assert!(PricingError::invalid_price("vat").is_client_error());
        assert!(PricingError::EmptyUpdate.is_client_error());
        assert!(PricingError::invalid_expiry("past").is_client_error());
    }

    #[test]
    fn not_found_and_storage_are_not_client_errors() {
        assert!(!PricingError::not_found().is_client_error());
        assert!(!PricingError::storage("lock poisoned").is_client_error());
    }

    #[test]
    fn storage_message_is_passed_through() {
        let err = PricingError::storage("disk full");
        assert_eq!(err.to_string(), "storage failure: disk full");
    }
}
