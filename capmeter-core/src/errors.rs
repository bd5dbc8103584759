//! Error Types for Hardware and Configuration Faults
//!
//! ## What Is (and Is Not) an Error
//!
//! A measurement cycle has several unhappy endings that are *expected* on a
//! bench: a large capacitor that will not discharge in time, a reading with
//! too few usable points, a suspiciously tiny value. Those are reported as
//! [`MeasurementStatus`](crate::estimate::MeasurementStatus) values inside
//! an `Ok` result, and the operator simply runs the next cycle.
//!
//! `MeterError` is reserved for things the cycle cannot reason about:
//!
//! ### Hardware Faults
//! - `ChargeLine`: the charge-control output could not be driven
//! - `SenseAdc`: the sense voltage could not be read
//! - `ClockWentBackwards`: the monotonic clock violated its contract
//!
//! ### Buffer and Setup Mistakes
//! - `SeriesFull`: a sample was pushed past the series capacity
//! - `InvalidConfig`: thresholds or timings that cannot work together
//!
//! ## Layout
//!
//! Errors stay `Copy` and carry no heap data (reasons are `&'static str`),
//! so they are cheap to return from the acquisition hot loop.
//!
//! ```rust
//! use capmeter_core::{MeterConfig, MeterError};
//!
//! let config = MeterConfig::default().with_known_resistance_ohms(0.0);
//! match config.validate() {
//!     Err(MeterError::InvalidConfig { reason }) => assert!(!reason.is_empty()),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for meter operations
pub type MeterResult<T> = Result<T, MeterError>;

/// Meter errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MeterError {
    /// Charge-control output could not be driven
    #[error("Charge line fault: {reason}")]
    ChargeLine {
        /// Driver-supplied description
        reason: &'static str,
    },

    /// Sense voltage could not be read
    #[error("Sense ADC fault: {reason}")]
    SenseAdc {
        /// Driver-supplied description
        reason: &'static str,
    },

    /// Monotonic clock returned an earlier timestamp than before
    #[error("Clock went backwards: {current_us}us after {previous_us}us")]
    ClockWentBackwards {
        /// Last accepted timestamp (microseconds)
        previous_us: u64,
        /// Offending timestamp (microseconds)
        current_us: u64,
    },

    /// Sample series has no room left
    #[error("Sample series full at {capacity} samples")]
    SeriesFull {
        /// Capacity of the series
        capacity: usize,
    },

    /// Configuration values cannot work together
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Which rule was broken
        reason: &'static str,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for MeterError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::ChargeLine { reason } =>
                defmt::write!(fmt, "Charge line: {}", reason),
            Self::SenseAdc { reason } =>
                defmt::write!(fmt, "Sense ADC: {}", reason),
            Self::ClockWentBackwards { previous_us, current_us } =>
                defmt::write!(fmt, "Clock {}us after {}us", current_us, previous_us),
            Self::SeriesFull { capacity } =>
                defmt::write!(fmt, "Series full at {}", capacity),
            Self::InvalidConfig { reason } =>
                defmt::write!(fmt, "Config: {}", reason),
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = MeterError::ClockWentBackwards { previous_us: 20, current_us: 10 };
        assert_eq!(err.to_string(), "Clock went backwards: 10us after 20us");

        let err = MeterError::SeriesFull { capacity: 2000 };
        assert!(err.to_string().contains("2000"));
    }

    #[test]
    fn errors_stay_small() {
        assert!(core::mem::size_of::<MeterError>() <= 24);
    }
}
