//! Core numeric types for the trading runtime

use crate::constants::fixed_point::SCALE_4;
use crate::constants::time::{NANOS_PER_MICRO, NANOS_PER_MILLI};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Price type (stored as i64 ticks for determinism, 4 decimal places)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Px(i64); // Internal: price in ticks (1 tick = 0.0001)

impl Px {
    /// Create a new Price from a float value.
    /// For external API compatibility only - prefer `from_i64`
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(clamp_to_i64(value * SCALE_4 as f64))
    }

    /// Get price as f64 for external APIs only.
    /// Internal code should stay in fixed-point arithmetic
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        // One conversion at the system boundary; callers interfacing with
        // floating-point collaborators go through here.
        #[allow(clippy::cast_precision_loss)]
        {
            self.0 as f64 / SCALE_4 as f64
        }
    }

    /// Get price as i64 ticks
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Create from i64 ticks
    #[must_use]
    pub const fn from_i64(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Zero price
    pub const ZERO: Self = Self(0);
}

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE_4;
        let frac = (self.0 % SCALE_4).abs();
        write!(f, "{whole}.{frac:04}")
    }
}

/// Quantity type for order sizes (stored as i64 units, 4 decimal places)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Qty(i64); // Internal: quantity in units (1 unit = 0.0001)

impl Qty {
    /// Create a new Quantity from a float value (external API compatibility)
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(clamp_to_i64(value * SCALE_4 as f64))
    }

    /// Get quantity as f64 for external APIs only
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        {
            self.0 as f64 / SCALE_4 as f64
        }
    }

    /// Create from whole units
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units * SCALE_4)
    }

    /// Get quantity as i64 units
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Create from i64 units
    #[must_use]
    pub const fn from_i64(units: i64) -> Self {
        Self(units)
    }

    /// Check if quantity is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Zero quantity
    pub const ZERO: Self = Self(0);

    /// Saturating subtraction, floored at zero
    #[must_use]
    pub const fn sub_floor(self, other: Self) -> Self {
        let diff = self.0 - other.0;
        Self(if diff < 0 { 0 } else { diff })
    }

    /// Smaller of two quantities
    #[must_use]
    pub const fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }
}

impl fmt::Display for Qty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE_4;
        let frac = (self.0 % SCALE_4).abs();
        write!(f, "{whole}.{frac:04}")
    }
}

// Safe f64 -> i64 with saturation at the representable bounds.
fn clamp_to_i64(scaled: f64) -> i64 {
    const MAX_SAFE: f64 = 9_223_372_036_854_775_807.0;
    const MIN_SAFE: f64 = -9_223_372_036_854_775_808.0;
    let rounded = scaled.round();
    if rounded >= MAX_SAFE {
        i64::MAX
    } else if rounded <= MIN_SAFE {
        i64::MIN
    } else {
        #[allow(clippy::cast_possible_truncation)]
        {
            rounded as i64
        }
    }
}

/// Timestamp in nanoseconds since UNIX epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ts(pub u64);

impl Ts {
    /// Get current timestamp
    #[must_use]
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_else(|_| std::time::Duration::from_secs(0));
        let nanos = duration.as_secs() * 1_000_000_000 + u64::from(duration.subsec_nanos());
        Self(nanos)
    }

    /// Create timestamp from nanoseconds
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Get timestamp as nanoseconds
    #[must_use]
    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Get timestamp as microseconds
    #[must_use]
    pub const fn as_micros(&self) -> u64 {
        self.0 / NANOS_PER_MICRO
    }

    /// Get timestamp as milliseconds
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0 / NANOS_PER_MILLI
    }
}

impl fmt::Display for Ts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Opposing side
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// FIX tag 54 value for this side
    #[must_use]
    pub const fn fix_code(&self) -> char {
        match self {
            Self::Buy => '1',
            Self::Sell => '2',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_px_roundtrip() {
        let px = Px::new(101.25);
        assert_eq!(px.as_i64(), 1_012_500);
        assert!((px.as_f64() - 101.25).abs() < 1e-9);
    }

    #[test]
    fn test_px_display() {
        assert_eq!(Px::from_i64(1_012_500).to_string(), "101.2500");
        assert_eq!(Px::ZERO.to_string(), "0.0000");
    }

    #[test]
    fn test_qty_from_units() {
        let qty = Qty::from_units(10);
        assert_eq!(qty.as_i64(), 100_000);
        assert!((qty.as_f64() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_qty_sub_floor() {
        let a = Qty::from_units(5);
        let b = Qty::from_units(8);
        assert_eq!(a.sub_floor(b), Qty::ZERO);
        assert_eq!(b.sub_floor(a), Qty::from_units(3));
    }

    #[test]
    fn test_clamp_extremes() {
        assert_eq!(Px::new(f64::MAX).as_i64(), i64::MAX);
        assert_eq!(Px::new(f64::MIN).as_i64(), i64::MIN);
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
        assert_eq!(Side::Buy.fix_code(), '1');
        assert_eq!(Side::Sell.fix_code(), '2');
    }

    #[test]
    fn test_ts_conversions() {
        let ts = Ts::from_nanos(1_234_567_890);
        assert_eq!(ts.as_nanos(), 1_234_567_890);
        assert_eq!(ts.as_micros(), 1_234_567);
        assert_eq!(ts.as_millis(), 1_234);
    }
}
