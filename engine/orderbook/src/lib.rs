//! Order book and matching engine
//!
//! Per-symbol order storage with price-time priority matching. Aggressive
//! orders are matched against the best opposing level at the passive price,
//! oldest resting order first; any residual quantity rests in the book.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod book;
pub mod engine;
pub mod order;

pub use book::{BookDepth, SymbolBook};
pub use engine::MatchingEngine;
pub use order::{Order, Trade};
