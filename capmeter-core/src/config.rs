//! Meter configuration
//!
//! One structure holds every threshold, timeout and budget the pipeline
//! uses. `Default` reproduces the bench constants from
//! [`constants`](crate::constants); tests tweak single values with the
//! `with_*` methods.
//!
//! ```rust
//! use capmeter_core::MeterConfig;
//! use fugit::MillisDurationU32;
//!
//! let config = MeterConfig::default()
//!     .with_known_resistance_ohms(4_700.0)
//!     .with_discharge_timeout(MillisDurationU32::from_ticks(30_000));
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.charge_stop_mv(), 3135.0);
//! ```

use fugit::MillisDurationU32;

use crate::constants::*;
use crate::errors::{MeterError, MeterResult};

/// Configuration for one capacitance meter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterConfig {
    /// Known series resistance (Ω)
    pub known_resistance_ohms: f64,

    /// Reference (full charge) voltage (mV)
    pub max_voltage_mv: f64,

    /// Voltage at or below which the capacitor counts as discharged (mV)
    pub discharge_floor_mv: f64,

    /// Give up discharging after this long
    pub discharge_timeout: MillisDurationU32,

    /// Wait between discharge polls
    pub discharge_poll_interval: MillisDurationU32,

    /// Wait after discharge before charging starts
    pub settle_delay: MillisDurationU32,

    /// Sample budget for one transient (clamped by the series capacity)
    pub max_samples: usize,

    /// Stop charging at this fraction of `max_voltage_mv`
    pub charge_stop_fraction: f64,

    /// Regression ignores samples at or below this voltage (mV)
    pub fit_floor_mv: f64,

    /// Regression ignores samples at or above this fraction of `max_voltage_mv`
    pub fit_ceiling_fraction: f64,

    /// Regression ignores samples whose normalized remaining charge is at or below this
    pub min_normalized: f64,

    /// A fit with this many accepted points or fewer is inconclusive
    pub min_valid_points: usize,

    /// Capacitances below this (µF) are flagged as a possible open circuit
    pub open_circuit_threshold_uf: f64,

    /// Cool-down after a discharge timeout
    pub timeout_cooldown: MillisDurationU32,

    /// Cool-down after a completed cycle
    pub cycle_cooldown: MillisDurationU32,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            known_resistance_ohms: KNOWN_RESISTANCE_OHMS,
            max_voltage_mv: VOLTAGE_MAX_MV,
            discharge_floor_mv: DISCHARGE_FLOOR_MV,
            discharge_timeout: MillisDurationU32::from_ticks(DISCHARGE_TIMEOUT_MS),
            discharge_poll_interval: MillisDurationU32::from_ticks(DISCHARGE_POLL_INTERVAL_MS),
            settle_delay: MillisDurationU32::from_ticks(SETTLE_DELAY_MS),
            max_samples: MAX_SAMPLES,
            charge_stop_fraction: CHARGE_STOP_FRACTION,
            fit_floor_mv: FIT_FLOOR_MV,
            fit_ceiling_fraction: FIT_CEILING_FRACTION,
            min_normalized: MIN_NORMALIZED,
            min_valid_points: MIN_VALID_POINTS,
            open_circuit_threshold_uf: OPEN_CIRCUIT_THRESHOLD_UF,
            timeout_cooldown: MillisDurationU32::from_ticks(TIMEOUT_COOLDOWN_MS),
            cycle_cooldown: MillisDurationU32::from_ticks(CYCLE_COOLDOWN_MS),
        }
    }
}

impl MeterConfig {
    /// Use a different known resistor
    pub fn with_known_resistance_ohms(mut self, ohms: f64) -> Self {
        self.known_resistance_ohms = ohms;
        self
    }

    /// Use a different reference voltage
    pub fn with_max_voltage_mv(mut self, mv: f64) -> Self {
        self.max_voltage_mv = mv;
        self
    }

    /// Use a different discharge floor
    pub fn with_discharge_floor_mv(mut self, mv: f64) -> Self {
        self.discharge_floor_mv = mv;
        self
    }

    /// Use a different discharge timeout
    pub fn with_discharge_timeout(mut self, timeout: MillisDurationU32) -> Self {
        self.discharge_timeout = timeout;
        self
    }

    /// Use a different settle delay
    pub fn with_settle_delay(mut self, delay: MillisDurationU32) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Use a different sample budget
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Use a different minimum point count
    pub fn with_min_valid_points(mut self, points: usize) -> Self {
        self.min_valid_points = points;
        self
    }

    /// Use a different open-circuit threshold
    pub fn with_open_circuit_threshold_uf(mut self, uf: f64) -> Self {
        self.open_circuit_threshold_uf = uf;
        self
    }

    /// Charging stops once a reading reaches this voltage (mV)
    pub fn charge_stop_mv(&self) -> f64 {
        self.max_voltage_mv * self.charge_stop_fraction
    }

    /// Upper edge of the regression window (mV)
    pub fn fit_ceiling_mv(&self) -> f64 {
        self.max_voltage_mv * self.fit_ceiling_fraction
    }

    /// Check that the values can work together
    ///
    /// `capacity` checks are done by the meter, which knows its buffer size.
    pub fn validate(&self) -> MeterResult<()> {
        let reject = |reason| Err(MeterError::InvalidConfig { reason });

        if !(self.known_resistance_ohms.is_finite() && self.known_resistance_ohms > 0.0) {
            return reject("known resistance must be positive");
        }
        if !(self.max_voltage_mv.is_finite() && self.max_voltage_mv > 0.0) {
            return reject("reference voltage must be positive");
        }
        if !(0.0..self.max_voltage_mv).contains(&self.discharge_floor_mv) {
            return reject("discharge floor must lie below the reference voltage");
        }
        if self.discharge_poll_interval.ticks() == 0 {
            return reject("discharge poll interval must be non-zero");
        }
        if self.max_samples == 0 {
            return reject("sample budget must be non-zero");
        }
        if !(self.charge_stop_fraction > 0.0 && self.charge_stop_fraction <= 1.0) {
            return reject("charge stop fraction must be in (0, 1]");
        }
        if !(self.fit_ceiling_fraction > 0.0 && self.fit_ceiling_fraction < 1.0) {
            return reject("fit ceiling fraction must be in (0, 1)");
        }
        if !(self.fit_floor_mv >= 0.0 && self.fit_floor_mv < self.fit_ceiling_mv()) {
            return reject("fit floor must lie below the fit ceiling");
        }
        if !(self.min_normalized > 0.0 && self.min_normalized < 1.0) {
            return reject("minimum normalized charge must be in (0, 1)");
        }
        if !(self.open_circuit_threshold_uf >= 0.0) {
            return reject("open-circuit threshold must not be negative");
        }

        Ok(())
    }
}
