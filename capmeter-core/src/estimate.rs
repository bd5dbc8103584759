//! Capacitance estimation and result classification
//!
//! Turns the regression sums into a [`MeasurementResult`]:
//!
//! ```text
//! slope = Σxy / Σx²
//! C     = -1 / (slope · R)
//! ```
//!
//! | condition                                   | status          |
//! |---------------------------------------------|-----------------|
//! | `valid_points <= min_valid_points`          | `Inconclusive`  |
//! | `Σx² <= 0`, slope `>= 0` or not finite      | `Inconclusive`  |
//! | `C < open_circuit_threshold` (µF)           | `OpenCircuit`   |
//! | otherwise                                   | `Normal`        |
//!
//! `OpenCircuit` still carries the value; it is a warning for the operator,
//! not a failed measurement. `DischargeTimeout` results never reach this
//! module: the cycle builds them directly.

use crate::config::MeterConfig;
use crate::constants::FARADS_PER_MICROFARAD;
use crate::fit::RegressionAccumulator;

/// Terminal state of one measurement cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasurementStatus {
    /// Plausible capacitance
    Normal,
    /// Value below the open-circuit threshold; reported, but suspicious
    OpenCircuit,
    /// Too few usable points for a fit
    Inconclusive,
    /// Capacitor did not discharge in time; nothing was sampled
    DischargeTimeout,
}

impl MeasurementStatus {
    /// Whether a capacitance value accompanies this status
    pub fn has_value(&self) -> bool {
        matches!(self, Self::Normal | Self::OpenCircuit)
    }
}

/// Outcome of one measurement cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasurementResult {
    /// How the cycle ended
    pub status: MeasurementStatus,
    /// Estimated capacitance (F); `None` unless `status.has_value()`
    pub capacitance_farads: Option<f64>,
    /// Fitted time constant RC (s); `None` unless `status.has_value()`
    pub time_constant_s: Option<f64>,
    /// Samples accepted by the regression filter
    pub valid_points: usize,
    /// Samples captured during acquisition
    pub samples_taken: usize,
    /// Uncentered R² of the fit, when a fit was made
    pub fit_r_squared: Option<f64>,
}

impl MeasurementResult {
    /// Result of a cycle aborted by the discharge timeout
    pub const fn discharge_timeout() -> Self {
        Self {
            status: MeasurementStatus::DischargeTimeout,
            capacitance_farads: None,
            time_constant_s: None,
            valid_points: 0,
            samples_taken: 0,
            fit_r_squared: None,
        }
    }

    /// Result of a fit that could not produce a value
    pub const fn inconclusive(valid_points: usize) -> Self {
        Self {
            status: MeasurementStatus::Inconclusive,
            capacitance_farads: None,
            time_constant_s: None,
            valid_points,
            samples_taken: 0,
            fit_r_squared: None,
        }
    }

    /// Record how many samples acquisition captured
    pub fn with_samples_taken(mut self, samples: usize) -> Self {
        self.samples_taken = samples;
        self
    }

    /// Capacitance in microfarads, the reporting scale
    pub fn capacitance_microfarads(&self) -> Option<f64> {
        self.capacitance_farads.map(|f| f / FARADS_PER_MICROFARAD)
    }
}

/// Decide validity and compute the capacitance
pub fn estimate(acc: &RegressionAccumulator, config: &MeterConfig) -> MeasurementResult {
    if acc.valid_points <= config.min_valid_points {
        log_debug!("inconclusive: {} valid points", acc.valid_points);
        return MeasurementResult::inconclusive(acc.valid_points);
    }

    let slope = match acc.slope() {
        Some(slope) if slope.is_finite() && slope < 0.0 => slope,
        _ => {
            log_warn!("inconclusive: degenerate fit over {} points", acc.valid_points);
            return MeasurementResult::inconclusive(acc.valid_points);
        }
    };

    let time_constant_s = -1.0 / slope;
    let capacitance_farads = time_constant_s / config.known_resistance_ohms;
    let capacitance_uf = capacitance_farads / FARADS_PER_MICROFARAD;

    let status = if capacitance_uf < config.open_circuit_threshold_uf {
        MeasurementStatus::OpenCircuit
    } else {
        MeasurementStatus::Normal
    };

    MeasurementResult {
        status,
        capacitance_farads: Some(capacitance_farads),
        time_constant_s: Some(time_constant_s),
        valid_points: acc.valid_points,
        samples_taken: 0,
        fit_r_squared: acc.r_squared(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accumulator(tau: f64, points: usize) -> RegressionAccumulator {
        let mut acc = RegressionAccumulator::new();
        for i in 1..=points {
            let x = i as f64 * tau / 20.0;
            acc.add(x, -x / tau);
        }
        acc
    }

    #[test]
    fn recovers_capacitance_from_time_constant() {
        let result = estimate(&accumulator(0.1, 20), &MeterConfig::default());

        assert_eq!(result.status, MeasurementStatus::Normal);
        assert!((result.capacitance_microfarads().unwrap() - 10.0).abs() < 1e-9);
        assert!((result.time_constant_s.unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(result.valid_points, 20);
    }

    #[test]
    fn five_points_are_not_enough() {
        let result = estimate(&accumulator(0.1, 5), &MeterConfig::default());

        assert_eq!(result.status, MeasurementStatus::Inconclusive);
        assert_eq!(result.capacitance_farads, None);
        assert_eq!(result.valid_points, 5);

        let result = estimate(&accumulator(0.1, 6), &MeterConfig::default());
        assert_eq!(result.status, MeasurementStatus::Normal);
    }

    #[test]
    fn tiny_value_is_flagged_but_reported() {
        // τ = 50 ns with 10 kΩ -> 5 pF
        let result = estimate(&accumulator(50e-9, 10), &MeterConfig::default());

        assert_eq!(result.status, MeasurementStatus::OpenCircuit);
        let uf = result.capacitance_microfarads().unwrap();
        assert!((uf - 5e-6).abs() < 1e-12);
    }

    #[test]
    fn threshold_is_configurable() {
        let config = MeterConfig::default().with_open_circuit_threshold_uf(20.0);
        let result = estimate(&accumulator(0.1, 20), &config);
        assert_eq!(result.status, MeasurementStatus::OpenCircuit);
    }

    #[test]
    fn degenerate_sums_are_inconclusive() {
        let zero_time = RegressionAccumulator { sum_xy: 0.0, sum_x2: 0.0, sum_y2: 1.0, valid_points: 50 };
        assert_eq!(estimate(&zero_time, &MeterConfig::default()).status, MeasurementStatus::Inconclusive);

        let rising = RegressionAccumulator { sum_xy: 0.3, sum_x2: 0.1, sum_y2: 1.0, valid_points: 50 };
        assert_eq!(estimate(&rising, &MeterConfig::default()).status, MeasurementStatus::Inconclusive);
    }

    #[test]
    fn timeout_result_carries_nothing() {
        let result = MeasurementResult::discharge_timeout();
        assert!(!result.status.has_value());
        assert_eq!(result.samples_taken, 0);
        assert_eq!(result.capacitance_microfarads(), None);
    }
}
