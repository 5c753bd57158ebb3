//! Error types for the FIX gateway

use engine_common::ValidationError;
use thiserror::Error;

/// Session-level error
#[derive(Debug, Error)]
pub enum SessionError {
    /// Operation requires a logged-on session
    #[error("Session not connected")]
    NotConnected,

    /// Order failed structural validation before transmission
    #[error("Order validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Underlying transport failure
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Counterparty rejected or the protocol state is unusable
    #[error("Protocol error: {message}")]
    Protocol {
        /// What went wrong at the protocol level
        message: String,
    },
}

/// Type alias for session results
pub type SessionResult<T> = Result<T, SessionError>;
