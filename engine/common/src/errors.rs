//! Common error types shared at API boundaries

use thiserror::Error;

/// Structural validation failure for an order or request.
///
/// Raised before any state mutation; a rejected input never reaches the
/// book or the wire.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Symbol is empty or unusable
    #[error("Invalid symbol: {reason}")]
    InvalidSymbol {
        /// Why the symbol was rejected
        reason: String,
    },

    /// Quantity must be strictly positive
    #[error("Invalid quantity {qty}: must be positive")]
    InvalidQuantity {
        /// The offending quantity in fixed-point units
        qty: i64,
    },

    /// Price must be strictly positive for priced orders
    #[error("Invalid price {px}: must be positive")]
    InvalidPrice {
        /// The offending price in ticks
        px: i64,
    },
}
