//! Per-symbol order book with price-time priority matching

use crate::order::{Order, Trade};
use engine_common::{Px, Qty, Side, Ts};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Key for order sorting (price-time priority)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OrderKey {
    /// Price in ticks (negated for bids so the best bid sorts first)
    price: i64,
    /// Arrival sequence for time priority within a level
    sequence: u64,
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.price
            .cmp(&other.price)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl OrderKey {
    fn for_side(side: Side, price: Px, sequence: u64) -> Self {
        let price = match side {
            // Negative so the highest bid sorts first in the BTreeMap
            Side::Buy => -price.as_i64(),
            Side::Sell => price.as_i64(),
        };
        Self { price, sequence }
    }
}

/// A resting order with its unfilled remainder
#[derive(Debug, Clone)]
struct RestingOrder {
    order: Order,
    remaining: Qty,
    sequence: u64,
}

/// Order book for a single symbol.
///
/// Both sides are price-ordered maps; within a price level orders keep
/// FIFO arrival order. Invariant: every resting order's symbol equals the
/// book's symbol.
#[derive(Debug, Default)]
pub struct SymbolBook {
    symbol: String,
    /// Buy side (best bid first via negated price keys)
    bids: BTreeMap<OrderKey, RestingOrder>,
    /// Sell side (best ask first)
    asks: BTreeMap<OrderKey, RestingOrder>,
    /// Last traded price
    last_price: Option<Px>,
    /// Total quantity matched in this book
    total_volume: i64,
}

/// Aggregated book depth, one `(price, quantity)` pair per level
#[derive(Debug, Clone)]
pub struct BookDepth {
    /// Bid levels, best first
    pub bids: Vec<(Px, Qty)>,
    /// Ask levels, best first
    pub asks: Vec<(Px, Qty)>,
    /// Last traded price, if any trade occurred
    pub last_price: Option<Px>,
}

impl SymbolBook {
    /// Create an empty book for `symbol`
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Match an incoming order and rest any residual quantity.
    ///
    /// The aggressive order trades against the best opposing level while
    /// price-compatible, at the passive order's price, oldest order first.
    /// Returns one `Trade` per resting order consumed.
    pub(crate) fn execute(&mut self, order: Order, sequence: u64) -> Vec<Trade> {
        debug_assert_eq!(order.symbol, self.symbol);

        let mut trades = Vec::new();
        let mut remaining = order.quantity;
        let mut last_price = self.last_price;
        let mut matched_volume = 0i64;

        let opposing = match order.side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };

        let mut to_remove = Vec::new();
        for (key, resting) in opposing.iter_mut() {
            if remaining.is_zero() {
                break;
            }

            let passive_px = resting.order.price;
            let crosses = match order.side {
                Side::Buy => passive_px <= order.price,
                Side::Sell => passive_px >= order.price,
            };
            if !crosses {
                break;
            }

            let match_qty = remaining.min(resting.remaining);
            trades.push(Trade {
                symbol: self.symbol.clone(),
                price: passive_px,
                quantity: match_qty,
                maker_order_id: resting.order.id.clone(),
                taker_order_id: order.id.clone(),
                taker_side: order.side,
                ts: Ts::now(),
            });

            remaining = remaining.sub_floor(match_qty);
            resting.remaining = resting.remaining.sub_floor(match_qty);
            if resting.remaining.is_zero() {
                to_remove.push(*key);
            }

            last_price = Some(passive_px);
            matched_volume += match_qty.as_i64();
        }

        for key in to_remove {
            opposing.remove(&key);
        }

        self.last_price = last_price;
        self.total_volume += matched_volume;

        if !remaining.is_zero() {
            let key = OrderKey::for_side(order.side, order.price, sequence);
            let side_book = match order.side {
                Side::Buy => &mut self.bids,
                Side::Sell => &mut self.asks,
            };
            side_book.insert(
                key,
                RestingOrder {
                    order,
                    remaining,
                    sequence,
                },
            );
        }

        if !trades.is_empty() {
            debug!(
                symbol = %self.symbol,
                fills = trades.len(),
                "order matched"
            );
        }

        trades
    }

    /// All resting orders in arrival order.
    ///
    /// Partially filled orders report their unfilled remainder as quantity.
    #[must_use]
    pub fn resting_orders(&self) -> Vec<Order> {
        let mut entries: Vec<(u64, Order)> = self
            .bids
            .values()
            .chain(self.asks.values())
            .map(|r| {
                let mut order = r.order.clone();
                order.quantity = r.remaining;
                (r.sequence, order)
            })
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, order)| order).collect()
    }

    /// Best bid price and total quantity at that price
    #[must_use]
    pub fn best_bid(&self) -> Option<(Px, Qty)> {
        Self::best_level(&self.bids)
    }

    /// Best ask price and total quantity at that price
    #[must_use]
    pub fn best_ask(&self) -> Option<(Px, Qty)> {
        Self::best_level(&self.asks)
    }

    fn best_level(side: &BTreeMap<OrderKey, RestingOrder>) -> Option<(Px, Qty)> {
        let mut iter = side.values();
        let first = iter.next()?;
        let price = first.order.price;
        let mut qty = first.remaining.as_i64();
        for resting in iter {
            if resting.order.price != price {
                break;
            }
            qty += resting.remaining.as_i64();
        }
        Some((price, Qty::from_i64(qty)))
    }

    /// Aggregated depth up to `levels` price levels per side
    #[must_use]
    pub fn depth(&self, levels: usize) -> BookDepth {
        BookDepth {
            bids: Self::aggregate(&self.bids, levels),
            asks: Self::aggregate(&self.asks, levels),
            last_price: self.last_price,
        }
    }

    fn aggregate(side: &BTreeMap<OrderKey, RestingOrder>, levels: usize) -> Vec<(Px, Qty)> {
        let mut out: Vec<(Px, Qty)> = Vec::new();
        for resting in side.values() {
            match out.last_mut() {
                Some((px, qty)) if *px == resting.order.price => {
                    *qty = Qty::from_i64(qty.as_i64() + resting.remaining.as_i64());
                }
                _ => {
                    if out.len() == levels {
                        break;
                    }
                    out.push((resting.order.price, resting.remaining));
                }
            }
        }
        out
    }

    /// Total quantity matched in this book since creation
    #[must_use]
    pub const fn total_volume(&self) -> i64 {
        self.total_volume
    }

    /// Last traded price, if any
    #[must_use]
    pub const fn last_price(&self) -> Option<Px> {
        self.last_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, side: Side, price: f64, units: i64) -> Order {
        Order::new(id, "AAPL", Px::new(price), Qty::from_units(units), side)
    }

    #[test]
    fn test_order_key_sorting() {
        // Buy keys: higher price sorts first (negated)
        let buy_high = OrderKey::for_side(Side::Buy, Px::new(110.0), 2);
        let buy_low = OrderKey::for_side(Side::Buy, Px::new(100.0), 1);
        assert!(buy_high < buy_low);

        // Sell keys: lower price sorts first
        let sell_low = OrderKey::for_side(Side::Sell, Px::new(100.0), 1);
        let sell_high = OrderKey::for_side(Side::Sell, Px::new(110.0), 2);
        assert!(sell_low < sell_high);

        // Same price: earlier arrival first
        let old = OrderKey::for_side(Side::Sell, Px::new(100.0), 1);
        let new = OrderKey::for_side(Side::Sell, Px::new(100.0), 2);
        assert!(old < new);
    }

    #[test]
    fn test_no_cross_rests_both() {
        let mut book = SymbolBook::new("AAPL");
        assert!(book.execute(order("b1", Side::Buy, 100.0, 10), 1).is_empty());
        assert!(book.execute(order("s1", Side::Sell, 101.0, 5), 2).is_empty());

        assert_eq!(book.resting_orders().len(), 2);
        assert_eq!(book.best_bid().unwrap().0, Px::new(100.0));
        assert_eq!(book.best_ask().unwrap().0, Px::new(101.0));
    }

    #[test]
    fn test_full_fill_at_passive_price() {
        let mut book = SymbolBook::new("AAPL");
        book.execute(order("s1", Side::Sell, 100.0, 10), 1);
        let trades = book.execute(order("b1", Side::Buy, 101.0, 10), 2);

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, Px::new(100.0)); // passive price
        assert_eq!(trades[0].quantity, Qty::from_units(10));
        assert_eq!(trades[0].maker_order_id, "s1");
        assert_eq!(trades[0].taker_order_id, "b1");
        assert!(book.resting_orders().is_empty());
        assert_eq!(book.last_price(), Some(Px::new(100.0)));
    }

    #[test]
    fn test_partial_fill_rests_residual() {
        let mut book = SymbolBook::new("AAPL");
        book.execute(order("s1", Side::Sell, 100.0, 4), 1);
        let trades = book.execute(order("b1", Side::Buy, 100.0, 10), 2);

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].quantity, Qty::from_units(4));

        let resting = book.resting_orders();
        assert_eq!(resting.len(), 1);
        assert_eq!(resting[0].id, "b1");
        assert_eq!(resting[0].quantity, Qty::from_units(6));
        assert_eq!(book.best_bid().unwrap(), (Px::new(100.0), Qty::from_units(6)));
    }

    #[test]
    fn test_multi_level_sweep() {
        let mut book = SymbolBook::new("AAPL");
        book.execute(order("s1", Side::Sell, 100.0, 5), 1);
        book.execute(order("s2", Side::Sell, 101.0, 5), 2);
        book.execute(order("s3", Side::Sell, 102.0, 5), 3);

        let trades = book.execute(order("b1", Side::Buy, 101.0, 8), 4);
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].price, Px::new(100.0));
        assert_eq!(trades[0].quantity, Qty::from_units(5));
        assert_eq!(trades[1].price, Px::new(101.0));
        assert_eq!(trades[1].quantity, Qty::from_units(3));

        // s2 keeps 2 units, s3 untouched; b1 fully filled
        let resting = book.resting_orders();
        assert_eq!(resting.len(), 2);
        assert_eq!(book.best_ask().unwrap(), (Px::new(101.0), Qty::from_units(2)));
        assert_eq!(book.total_volume(), Qty::from_units(8).as_i64());
    }

    #[test]
    fn test_fifo_within_level() {
        let mut book = SymbolBook::new("AAPL");
        book.execute(order("s1", Side::Sell, 100.0, 5), 1);
        book.execute(order("s2", Side::Sell, 100.0, 5), 2);

        let trades = book.execute(order("b1", Side::Buy, 100.0, 6), 3);
        assert_eq!(trades.len(), 2);
        // Older resting order consumed first
        assert_eq!(trades[0].maker_order_id, "s1");
        assert_eq!(trades[0].quantity, Qty::from_units(5));
        assert_eq!(trades[1].maker_order_id, "s2");
        assert_eq!(trades[1].quantity, Qty::from_units(1));
    }

    #[test]
    fn test_depth_aggregation() {
        let mut book = SymbolBook::new("AAPL");
        book.execute(order("b1", Side::Buy, 100.0, 5), 1);
        book.execute(order("b2", Side::Buy, 100.0, 3), 2);
        book.execute(order("b3", Side::Buy, 99.0, 7), 3);

        let depth = book.depth(2);
        assert_eq!(depth.bids.len(), 2);
        assert_eq!(depth.bids[0], (Px::new(100.0), Qty::from_units(8)));
        assert_eq!(depth.bids[1], (Px::new(99.0), Qty::from_units(7)));
        assert!(depth.asks.is_empty());
    }
}
