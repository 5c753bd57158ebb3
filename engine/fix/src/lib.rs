//! FIX session gateway
//!
//! A FIX-protocol session state machine that owns a pluggable transport,
//! turns outbound order requests into protocol messages, and delivers
//! inbound execution reports to the host through a polled queue or a
//! registered callback.
//!
//! The transport is injected at construction: [`SimulatedTransport`] for
//! development and tests (orders fill immediately), [`WireTransport`] for a
//! real TCP counterparty.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod channel;
pub mod codec;
pub mod error;
pub mod messages;
pub mod session;
pub mod transport;

pub use channel::ExecReportChannel;
pub use error::SessionError;
pub use messages::{ExecReport, ExecType, FixOrder, OrdStatus, OrdType};
pub use session::{FixSession, SessionState};
pub use transport::{FixTransport, SimulatedTransport, WireTransport};
