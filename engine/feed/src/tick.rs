//! Tick datagram format
//!
//! One tick per datagram, CSV-encoded: `SYMBOL,PRICE,QTY,SIDE` where
//! SIDE is `B`/`S` (or FIX-style `1`/`2`). Example: `AAPL,187.25,100,B`.

use engine_common::{Px, Qty, Side, Ts};

/// A single market tick
#[derive(Debug, Clone, PartialEq)]
pub struct MarketTick {
    /// Instrument symbol
    pub symbol: String,
    /// Trade or quote price
    pub price: Px,
    /// Quantity
    pub quantity: Qty,
    /// Aggressor side
    pub side: Side,
    /// Local receive timestamp
    pub ts: Ts,
}

impl MarketTick {
    /// Parse one datagram payload. Returns `None` for anything that is
    /// not a well-formed tick; the caller decides how to count drops.
    #[must_use]
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(payload).ok()?;
        let mut parts = text.trim().split(',');

        let symbol = parts.next()?.trim();
        if symbol.is_empty() {
            return None;
        }
        let price: f64 = parts.next()?.trim().parse().ok()?;
        let quantity: f64 = parts.next()?.trim().parse().ok()?;
        let side = match parts.next()?.trim() {
            "B" | "b" | "1" => Side::Buy,
            "S" | "s" | "2" => Side::Sell,
            _ => return None,
        };
        if parts.next().is_some() {
            return None; // trailing fields
        }
        if !price.is_finite() || price <= 0.0 || !quantity.is_finite() || quantity <= 0.0 {
            return None;
        }

        Some(Self {
            symbol: symbol.to_string(),
            price: Px::new(price),
            quantity: Qty::new(quantity),
            side,
            ts: Ts::now(),
        })
    }
}
