//! Order and trade definitions

use engine_common::{Px, Qty, Side, Ts};
use serde::{Deserialize, Serialize};

/// A single order.
///
/// Immutable once placed; cancellation and amendment are not modeled at
/// this layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Caller-assigned order identifier
    pub id: String,
    /// Instrument symbol
    pub symbol: String,
    /// Limit price
    pub price: Px,
    /// Order quantity
    pub quantity: Qty,
    /// Order side
    pub side: Side,
}

impl Order {
    /// Create a new order
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        price: Px,
        quantity: Qty,
        side: Side,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            price,
            quantity,
            side,
        }
    }

    /// Whether this is a buy order
    #[must_use]
    pub const fn is_buy(&self) -> bool {
        matches!(self.side, Side::Buy)
    }
}

/// A fill produced by the matching engine.
///
/// One `Trade` is emitted per resting order consumed, at the resting
/// (passive) order's price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// Instrument symbol
    pub symbol: String,
    /// Execution price (the passive order's price)
    pub price: Px,
    /// Matched quantity
    pub quantity: Qty,
    /// Resting (maker) order id
    pub maker_order_id: String,
    /// Aggressive (taker) order id
    pub taker_order_id: String,
    /// Side of the aggressive order
    pub taker_side: Side,
    /// Match timestamp
    pub ts: Ts,
}
