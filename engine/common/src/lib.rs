//! Shared types for the trading runtime
//!
//! Fixed-point price/quantity types, the side enum, configuration structs
//! and the validation error used at every API boundary.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

pub use config::{FeedConfig, FixConfig};
pub use errors::ValidationError;
pub use types::{Px, Qty, Side, Ts};
