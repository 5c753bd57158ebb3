//! Named constants shared across the runtime

/// Fixed-point scale factors
pub mod fixed_point {
    /// Scale for 4 decimal places (1 tick = 0.0001)
    pub const SCALE_4: i64 = 10_000;
}

/// Time conversion constants
pub mod time {
    /// Nanoseconds per microsecond
    pub const NANOS_PER_MICRO: u64 = 1_000;
    /// Nanoseconds per millisecond
    pub const NANOS_PER_MILLI: u64 = 1_000_000;
    /// Nanoseconds per second
    pub const NANOS_PER_SEC: u64 = 1_000_000_000;
}

/// Network defaults
pub mod net {
    /// Default UDP receive buffer size for the market-data listener
    pub const FEED_RECV_BUF: usize = 1024;
    /// Default market-data port
    pub const DEFAULT_FEED_PORT: u16 = 9001;
    /// Default FIX counterparty port
    pub const DEFAULT_FIX_PORT: u16 = 9876;
}
