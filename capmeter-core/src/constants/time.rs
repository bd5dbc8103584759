//! Time-Related Constants

/// Microseconds per second.
pub const US_PER_SECOND: f64 = 1_000_000.0;

/// Microseconds per millisecond.
pub const US_PER_MS: u64 = 1000;

/// Maximum time spent waiting for discharge (milliseconds).
///
/// Large electrolytics can take longer; the cycle then reports a
/// discharge timeout and tries again.
pub const DISCHARGE_TIMEOUT_MS: u32 = 10_000;

/// Interval between discharge polls (milliseconds).
pub const DISCHARGE_POLL_INTERVAL_MS: u32 = 10;

/// Wait after a successful discharge before charging (milliseconds).
pub const SETTLE_DELAY_MS: u32 = 1000;

/// Cool-down after a discharge timeout (milliseconds).
pub const TIMEOUT_COOLDOWN_MS: u32 = 2000;

/// Cool-down after any completed cycle (milliseconds).
pub const CYCLE_COOLDOWN_MS: u32 = 3000;
