//! Default Constants for the Capacitance Meter
//!
//! Every numeric default used by [`MeterConfig`](crate::config::MeterConfig)
//! lives here, with its unit in the name. The values match the reference
//! bench setup: an ESP32 driving a 10 kΩ resistor from its 3.3 V rail and
//! reading the capacitor node through its 12-bit ADC.
//!
//! ## Organization
//!
//! - **Circuit**: the known resistor and the reference voltage scale
//! - **Acquisition**: sample budget and the regression window
//! - **Time**: discharge timing, settle and cool-down delays
//!
//! ## Usage Guidelines
//!
//! 1. Prefer reading values through `MeterConfig` so tests can vary them
//! 2. Keep the regression window values unchanged unless results are
//!    meant to diverge from earlier measurements

/// Known resistor and reference scale of the bench circuit.
pub mod circuit;

/// Sample budget, stop threshold and regression window.
pub mod acquisition;

/// Discharge timing and inter-cycle delays.
pub mod time;

pub use acquisition::*;
pub use circuit::*;
pub use time::*;
