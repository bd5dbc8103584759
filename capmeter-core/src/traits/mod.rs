//! Hardware and Reporting Boundaries
//!
//! The measurement core never touches registers. Everything physical
//! enters through these traits, which lets the same pipeline run on an
//! MCU, against the [`sim`](crate::sim) circuit, or against hand-written
//! fakes in tests.
//!
//! ## Module Organization
//!
//! - [`hardware`] - charge-control output and sense voltage input
//! - [`time`] - monotonic microsecond clock and blocking delay
//!
//! [`Reporter`] is defined here: it is the single outbound interface.

pub mod hardware;
pub mod time;

pub use hardware::{ChargeLine, SenseAdc};
pub use time::{Delay, MonotonicClock};

use crate::estimate::MeasurementResult;

/// Receives one result per measurement cycle
///
/// Formatting is up to the implementation; `MeasurementResult` implements
/// `Display` with the operator-facing text.
pub trait Reporter {
    /// Handle the result of cycle number `cycle` (starting at 1)
    fn report(&mut self, cycle: u32, result: &MeasurementResult);
}
