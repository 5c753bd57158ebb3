//! Feed error types

use thiserror::Error;

/// Market-data feed errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// Socket bind or I/O failure
    #[error("feed I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `start` called on a feed that is already listening
    #[error("feed is already running")]
    AlreadyRunning,
}
