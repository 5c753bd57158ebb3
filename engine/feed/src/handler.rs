//! Tick consumers
//!
//! The feed hands every parsed tick to a [`TickHandler`]. [`BookHandler`]
//! routes ticks into a matching engine as limit orders; [`LoggingHandler`]
//! just logs them, useful when wiring up a new feed.

use crate::tick::MarketTick;
use orderbook::{MatchingEngine, Order};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

/// Consumer of parsed ticks.
///
/// Called from the feed's receive task; implementations should return
/// quickly to keep the socket drained.
pub trait TickHandler: Send + Sync {
    /// Handle one tick
    fn on_tick(&self, tick: &MarketTick);
}

/// Logs each tick and does nothing else
#[derive(Debug, Default)]
pub struct LoggingHandler;

impl TickHandler for LoggingHandler {
    fn on_tick(&self, tick: &MarketTick) {
        info!(
            symbol = %tick.symbol,
            price = %tick.price,
            qty = %tick.quantity,
            side = %tick.side,
            "tick"
        );
    }
}

/// Routes ticks into a matching engine as limit orders.
///
/// Each tick becomes an order with a feed-assigned id (`MD-<n>`); any
/// trades it produces are logged. Ticks the engine rejects are logged
/// and skipped.
pub struct BookHandler {
    engine: Arc<MatchingEngine>,
    next_id: AtomicU64,
}

impl BookHandler {
    /// Wrap a matching engine
    #[must_use]
    pub fn new(engine: Arc<MatchingEngine>) -> Self {
        Self {
            engine,
            next_id: AtomicU64::new(1),
        }
    }
}

impl TickHandler for BookHandler {
    fn on_tick(&self, tick: &MarketTick) {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let order = Order::new(
            format!("MD-{n}"),
            tick.symbol.clone(),
            tick.price,
            tick.quantity,
            tick.side,
        );
        match self.engine.add_order(order) {
            Ok(trades) => {
                for trade in &trades {
                    info!(
                        symbol = %trade.symbol,
                        price = %trade.price,
                        qty = %trade.quantity,
                        maker = %trade.maker_order_id,
                        taker = %trade.taker_order_id,
                        "trade"
                    );
                }
            }
            Err(e) => warn!(symbol = %tick.symbol, error = %e, "tick rejected by engine"),
        }
    }
}
