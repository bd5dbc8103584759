//! Acquisition and Regression Window Constants

/// Sense voltage (mV) at or below which the capacitor counts as empty.
pub const DISCHARGE_FLOOR_MV: f64 = 10.0;

/// Maximum samples captured in one charge transient.
///
/// Also the compile-time capacity of the default
/// [`SampleSeries`](crate::samples::SampleSeries).
pub const MAX_SAMPLES: usize = 2000;

/// Fraction of the reference voltage at which charging stops.
///
/// Past ~3τ the curve is nearly flat; charging further only heats the
/// resistor.
pub const CHARGE_STOP_FRACTION: f64 = 0.95;

/// Lower edge of the regression window (mV).
///
/// Readings at or below this are dominated by ADC offset and noise.
pub const FIT_FLOOR_MV: f64 = 15.0;

/// Upper edge of the regression window as a fraction of the reference.
///
/// 1 - e^-1 ≈ 0.632, i.e. one time constant. Past this point the log
/// transform amplifies quantization error. Load-bearing for comparisons
/// with historical measurements.
pub const FIT_CEILING_FRACTION: f64 = 0.632;

/// Smallest normalized remaining charge `(Vmax - V) / Vmax` fed to `ln`.
pub const MIN_NORMALIZED: f64 = 0.0001;

/// Number of accepted points at or below which a fit is inconclusive.
pub const MIN_VALID_POINTS: usize = 5;

/// Capacitance below which an open circuit is suspected (µF).
pub const OPEN_CIRCUIT_THRESHOLD_UF: f64 = 0.01;
