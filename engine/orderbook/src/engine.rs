//! Matching engine facade over per-symbol books

use crate::book::{BookDepth, SymbolBook};
use crate::order::{Order, Trade};
use engine_common::{Px, Qty, ValidationError};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Matching engine holding one book per symbol.
///
/// Access is serialized internally, so the feed loop and host-issued
/// orders may share one instance across threads.
#[derive(Debug, Default)]
pub struct MatchingEngine {
    /// Order books by symbol
    books: RwLock<FxHashMap<String, SymbolBook>>,
    /// Arrival sequence for time priority
    sequence: AtomicU64,
}

impl MatchingEngine {
    /// Create a new empty engine
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add an order, returning any fills it produced.
    ///
    /// Residual quantity rests in the book and becomes visible to
    /// `get_order_book`. Rejected orders leave the book untouched.
    pub fn add_order(&self, order: Order) -> Result<Vec<Trade>, ValidationError> {
        Self::validate(&order)?;

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let mut books = self.books.write();
        let book = books
            .entry(order.symbol.clone())
            .or_insert_with(|| SymbolBook::new(order.symbol.clone()));

        let trades = book.execute(order, sequence);
        debug!(fills = trades.len(), "order accepted");
        Ok(trades)
    }

    /// All resting orders for `symbol` in arrival order.
    ///
    /// Unknown symbols yield an empty vector, not an error.
    #[must_use]
    pub fn get_order_book(&self, symbol: &str) -> Vec<Order> {
        self.books
            .read()
            .get(symbol)
            .map(SymbolBook::resting_orders)
            .unwrap_or_default()
    }

    /// Best bid for `symbol`, if any
    #[must_use]
    pub fn best_bid(&self, symbol: &str) -> Option<(Px, Qty)> {
        self.books.read().get(symbol).and_then(SymbolBook::best_bid)
    }

    /// Best ask for `symbol`, if any
    #[must_use]
    pub fn best_ask(&self, symbol: &str) -> Option<(Px, Qty)> {
        self.books.read().get(symbol).and_then(SymbolBook::best_ask)
    }

    /// Aggregated depth for `symbol` up to `levels` per side
    #[must_use]
    pub fn depth(&self, symbol: &str, levels: usize) -> Option<BookDepth> {
        self.books.read().get(symbol).map(|b| b.depth(levels))
    }

    fn validate(order: &Order) -> Result<(), ValidationError> {
        if order.symbol.trim().is_empty() {
            return Err(ValidationError::InvalidSymbol {
                reason: "empty symbol".to_string(),
            });
        }
        if order.quantity.as_i64() <= 0 {
            return Err(ValidationError::InvalidQuantity {
                qty: order.quantity.as_i64(),
            });
        }
        if order.price.as_i64() <= 0 {
            return Err(ValidationError::InvalidPrice {
                px: order.price.as_i64(),
            });
        }
        Ok(())
    }
}
