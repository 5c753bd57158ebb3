//! FIX order and execution-report message types

use engine_common::{Px, Qty, Side, Ts, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order type (FIX tag 40)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrdType {
    /// Market order
    Market,
    /// Limit order
    Limit,
}

impl OrdType {
    /// FIX tag 40 value
    #[must_use]
    pub const fn fix_code(&self) -> char {
        match self {
            Self::Market => '1',
            Self::Limit => '2',
        }
    }
}

/// Execution type (FIX tag 150)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecType {
    /// Order accepted, nothing executed yet
    New,
    /// Partial execution
    PartialFill,
    /// Full execution
    Fill,
    /// Order rejected
    Rejected,
}

impl ExecType {
    /// FIX tag 150 value
    #[must_use]
    pub const fn fix_code(&self) -> char {
        match self {
            Self::New => '0',
            Self::PartialFill => '1',
            Self::Fill => '2',
            Self::Rejected => '8',
        }
    }

    /// Decode from a FIX tag 150 value
    #[must_use]
    pub const fn from_fix_code(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::New),
            '1' => Some(Self::PartialFill),
            '2' => Some(Self::Fill),
            '8' => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Order status (FIX tag 39)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrdStatus {
    /// Accepted, unexecuted
    New,
    /// Partially filled
    PartiallyFilled,
    /// Fully filled
    Filled,
    /// Rejected
    Rejected,
}

impl OrdStatus {
    /// FIX tag 39 value
    #[must_use]
    pub const fn fix_code(&self) -> char {
        match self {
            Self::New => '0',
            Self::PartiallyFilled => '1',
            Self::Filled => '2',
            Self::Rejected => '8',
        }
    }

    /// Decode from a FIX tag 39 value
    #[must_use]
    pub const fn from_fix_code(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::New),
            '1' => Some(Self::PartiallyFilled),
            '2' => Some(Self::Filled),
            '8' => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for OrdStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "New"),
            Self::PartiallyFilled => write!(f, "PartiallyFilled"),
            Self::Filled => write!(f, "Filled"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// Outbound order request, produced by the host and consumed once by
/// `FixSession::send_order`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixOrder {
    /// Client order id (tag 11)
    pub cl_ord_id: String,
    /// Instrument symbol (tag 55)
    pub symbol: String,
    /// Side (tag 54)
    pub side: Side,
    /// Order type (tag 40)
    pub ord_type: OrdType,
    /// Quantity (tag 38)
    pub quantity: Qty,
    /// Limit price (tag 44, ignored for market orders)
    pub price: Px,
}

impl FixOrder {
    /// Structural validation applied before an order reaches the wire
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::InvalidSymbol {
                reason: "empty symbol".to_string(),
            });
        }
        if self.quantity.as_i64() <= 0 {
            return Err(ValidationError::InvalidQuantity {
                qty: self.quantity.as_i64(),
            });
        }
        if matches!(self.ord_type, OrdType::Limit) && self.price.as_i64() <= 0 {
            return Err(ValidationError::InvalidPrice {
                px: self.price.as_i64(),
            });
        }
        Ok(())
    }
}

/// Execution report describing the current state of an order.
///
/// Invariant: over an order's full report sequence,
/// `cum_qty + leaves_qty` equals the original order quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecReport {
    /// Exchange-assigned order id (tag 37)
    pub order_id: String,
    /// Unique execution id (tag 17), unique per session lifetime
    pub exec_id: String,
    /// Execution type (tag 150)
    pub exec_type: ExecType,
    /// Order status (tag 39)
    pub ord_status: OrdStatus,
    /// Instrument symbol (tag 55)
    pub symbol: String,
    /// Side (tag 54)
    pub side: Side,
    /// Quantity open for further execution (tag 151)
    pub leaves_qty: Qty,
    /// Cumulative executed quantity (tag 14)
    pub cum_qty: Qty,
    /// Average execution price (tag 6)
    pub avg_px: Px,
    /// Last execution price (tag 31)
    pub last_px: Px,
    /// Last executed quantity (tag 32)
    pub last_qty: Qty,
    /// Free-form text (tag 58)
    pub text: String,
    /// Transaction timestamp (tag 60)
    pub transact_time: Ts,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit_order(qty: i64, px: f64) -> FixOrder {
        FixOrder {
            cl_ord_id: "C1".to_string(),
            symbol: "AAPL".to_string(),
            side: Side::Buy,
            ord_type: OrdType::Limit,
            quantity: Qty::from_units(qty),
            price: Px::new(px),
        }
    }

    #[test]
    fn test_valid_limit_order() {
        assert!(limit_order(10, 100.0).validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let err = limit_order(0, 100.0).validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidQuantity { .. }));
    }

    #[test]
    fn test_rejects_empty_symbol() {
        let mut order = limit_order(10, 100.0);
        order.symbol = "  ".to_string();
        assert!(matches!(
            order.validate().unwrap_err(),
            ValidationError::InvalidSymbol { .. }
        ));
    }

    #[test]
    fn test_market_order_ignores_price() {
        let mut order = limit_order(10, 0.0);
        order.ord_type = OrdType::Market;
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_fix_code_roundtrip() {
        for status in [
            OrdStatus::New,
            OrdStatus::PartiallyFilled,
            OrdStatus::Filled,
            OrdStatus::Rejected,
        ] {
            assert_eq!(OrdStatus::from_fix_code(status.fix_code()), Some(status));
        }
        for exec in [
            ExecType::New,
            ExecType::PartialFill,
            ExecType::Fill,
            ExecType::Rejected,
        ] {
            assert_eq!(ExecType::from_fix_code(exec.fix_code()), Some(exec));
        }
    }
}
