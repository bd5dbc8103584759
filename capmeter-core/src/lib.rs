//! Capacitance estimation from an RC charging transient
//!
//! Charges an unknown capacitor through a known resistor, samples the
//! voltage curve and fits `ln(1 - V/Vmax) = -t/RC` to recover the time
//! constant. Built for a single bench operator on a small MCU.
//!
//! Key constraints:
//! - Runs without an allocator (`no_std` without `std` feature)
//! - Sample buffer is bounded and owned by one measurement cycle
//! - Hardware is reached only through the traits in [`traits`]
//!
//! Pipeline, strictly forward:
//!
//! ```text
//! Discharger -> Acquirer -> fit -> estimate -> Reporter
//! ```
//!
//! ```no_run
//! use core::cell::Cell;
//! use capmeter_core::{CapacitanceMeter, MeterConfig};
//! use capmeter_core::sim::{RcCircuit, VirtualClock};
//!
//! let now_us = Cell::new(0);
//! let circuit = RcCircuit::new(&now_us, 10_000.0, 10e-6);
//! let mut meter: CapacitanceMeter<_, _, _> = CapacitanceMeter::new(
//!     circuit.charge_line(),
//!     circuit.sense(),
//!     VirtualClock::new(&now_us),
//!     MeterConfig::default(),
//! )?;
//!
//! let result = meter.measure()?;
//! println!("{}", result);
//! # Ok::<(), capmeter_core::MeterError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod logging;

pub mod acquire;
pub mod config;
pub mod constants;
pub mod discharge;
pub mod errors;
pub mod estimate;
pub mod fit;
pub mod meter;
pub mod report;
pub mod samples;
pub mod sim;
pub mod traits;

// Public API
pub use config::MeterConfig;
pub use errors::{MeterError, MeterResult};
pub use estimate::{estimate, MeasurementResult, MeasurementStatus};
pub use fit::{fit, RegressionAccumulator};
pub use meter::CapacitanceMeter;
pub use samples::{Sample, SampleSeries};
pub use traits::{ChargeLine, Delay, MonotonicClock, Reporter, SenseAdc};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
