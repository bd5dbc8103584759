//! Circuit Constants
//!
//! The charge path is `charge pin -> R_KNOWN -> capacitor -> GND`, with the
//! ADC sensing the capacitor node.

/// Known series resistance (Ω).
///
/// A 10 kΩ resistor puts 1 µF at τ = 10 ms, comfortably inside the
/// acquisition window of the reference ADC loop.
pub const KNOWN_RESISTANCE_OHMS: f64 = 10_000.0;

/// Reference (full charge) voltage (mV).
///
/// The charge pin is a 3.3 V GPIO; the capacitor asymptotically reaches
/// this value.
pub const VOLTAGE_MAX_MV: f64 = 3300.0;

/// ADC resolution (bits).
///
/// Calibration is done once by the board setup; the core only consumes
/// millivolts. Used by the simulator to quantize readings.
pub const ADC_RESOLUTION_BITS: u8 = 12;

/// ADC full-scale input (mV) with 11 dB attenuation.
pub const ADC_FULL_SCALE_MV: f64 = 3300.0;

/// Farads per microfarad.
pub const FARADS_PER_MICROFARAD: f64 = 1.0e-6;
