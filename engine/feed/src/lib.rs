//! UDP market-data ingest
//!
//! Listens for tick datagrams, parses them, and fans them out to a
//! [`TickHandler`]. The listener is re-armed after every datagram and
//! after every receive error; only an explicit [`MarketDataFeed::stop`]
//! ends it. Malformed input is dropped and counted, never fatal.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod feed;
pub mod handler;
pub mod tick;

pub use error::FeedError;
pub use feed::{FeedStats, MarketDataFeed};
pub use handler::{BookHandler, LoggingHandler, TickHandler};
pub use tick::MarketTick;
