//! Charge and Sense Abstractions
//!
//! Two capabilities make up the analog front end:
//!
//! - a digital output that drives the charge resistor (`ChargeLine`)
//! - an ADC channel on the capacitor node, already calibrated to
//!   millivolts (`SenseAdc`)
//!
//! ADC reads follow the `nb` model used across embedded-hal drivers: a
//! conversion that is still running reports `WouldBlock`, and the caller
//! decides whether to spin (`nb::block!`) or do something else.
//!
//! ## Example Implementation
//!
//! ```rust
//! use capmeter_core::traits::{ChargeLine, SenseAdc};
//! use capmeter_core::MeterResult;
//!
//! struct Pin { high: bool }
//!
//! impl ChargeLine for Pin {
//!     fn set_active(&mut self, active: bool) -> MeterResult<()> {
//!         self.high = active; // write the GPIO here
//!         Ok(())
//!     }
//! }
//!
//! struct Adc { last_mv: f64 }
//!
//! impl SenseAdc for Adc {
//!     fn read_millivolts(&mut self) -> nb::Result<f64, capmeter_core::MeterError> {
//!         Ok(self.last_mv) // start/poll a conversion here
//!     }
//! }
//! ```

use crate::errors::{MeterError, MeterResult};

/// Charge-control output
///
/// Active means the resistor is driven to the reference voltage; inactive
/// means it is pulled to ground, which discharges the capacitor through
/// the same resistor.
pub trait ChargeLine {
    /// Drive the line active (charging) or inactive (discharging)
    fn set_active(&mut self, active: bool) -> MeterResult<()>;
}

/// Sense voltage input
pub trait SenseAdc {
    /// Read the capacitor voltage in millivolts
    ///
    /// Returns:
    /// - `Ok(mv)` - conversion complete
    /// - `Err(nb::Error::WouldBlock)` - conversion still running
    /// - `Err(nb::Error::Other(e))` - ADC fault
    fn read_millivolts(&mut self) -> nb::Result<f64, MeterError>;
}

impl<T: ChargeLine + ?Sized> ChargeLine for &mut T {
    fn set_active(&mut self, active: bool) -> MeterResult<()> {
        (**self).set_active(active)
    }
}

impl<T: SenseAdc + ?Sized> SenseAdc for &mut T {
    fn read_millivolts(&mut self) -> nb::Result<f64, MeterError> {
        (**self).read_millivolts()
    }
}
