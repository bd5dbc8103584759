//! Quality-filtered, origin-forced log-linear regression
//!
//! ## Theory
//!
//! An RC circuit charging from zero follows
//!
//! ```text
//! V(t) = Vmax · (1 - e^(-t/RC))
//! ```
//!
//! so with `y = ln(1 - V/Vmax)` and `x = t` the curve becomes the line
//! `y = -x / RC` through the origin. A least-squares fit with no intercept
//! gives
//!
//! ```text
//! slope = Σxy / Σx²  =  -1 / RC
//! ```
//!
//! Forcing the line through `(0, 0)` matches the model (V(0) = 0) and keeps
//! the fit stable when only a handful of points survive filtering.
//!
//! ## Filtering
//!
//! Each sample goes through these checks, in order:
//!
//! 1. `V <= floor` (15 mV): ADC noise at the start of the transient
//! 2. `V >= ceiling` (63.2% Vmax, one τ): the flat tail, where the log
//!    transform amplifies quantization error
//! 3. `(Vmax - V) / Vmax <= min_normalized`: would feed `ln` a value near
//!    zero
//!
//! Survivors are accumulated. No slope is computed here; whether there are
//! enough points is the estimator's call.
//!
//! ```rust
//! use capmeter_core::{fit, MeterConfig, Sample, SampleSeries};
//!
//! let tau = 0.01;
//! let mut series: SampleSeries<64> = SampleSeries::new();
//! for i in 0..64 {
//!     let t = i as f64 * 2e-4;
//!     series.try_push(Sample::new(t, 3300.0 * (1.0 - (-t / tau).exp())))?;
//! }
//!
//! let acc = fit(&series, &MeterConfig::default());
//! let slope = acc.slope().unwrap();
//! assert!((-1.0 / slope - tau).abs() < 1e-9);
//! # Ok::<(), capmeter_core::MeterError>(())
//! ```

use crate::config::MeterConfig;
use crate::samples::{Sample, SampleSeries};

/// What the filter decided about one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterVerdict {
    /// Inside the regression window; carries `(x, y)`
    Accepted {
        /// Elapsed seconds
        x: f64,
        /// `ln((Vmax - V) / Vmax)`
        y: f64,
    },
    /// At or below the noise floor
    BelowNoiseFloor,
    /// At or above the one-τ ceiling
    AboveTauCutoff,
    /// Normalized remaining charge too small for `ln`
    Saturated,
}

impl FilterVerdict {
    /// Whether the sample is used by the fit
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Bounds of the linear region of the charge curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitWindow {
    max_voltage_mv: f64,
    floor_mv: f64,
    ceiling_mv: f64,
    min_normalized: f64,
}

impl FitWindow {
    /// Window described by the meter configuration
    pub fn from_config(config: &MeterConfig) -> Self {
        Self {
            max_voltage_mv: config.max_voltage_mv,
            floor_mv: config.fit_floor_mv,
            ceiling_mv: config.fit_ceiling_mv(),
            min_normalized: config.min_normalized,
        }
    }

    /// Run the filter chain on one sample
    pub fn classify(&self, sample: &Sample) -> FilterVerdict {
        let v = sample.millivolts;

        if v <= self.floor_mv {
            return FilterVerdict::BelowNoiseFloor;
        }
        if v >= self.ceiling_mv {
            return FilterVerdict::AboveTauCutoff;
        }

        let normalized = (self.max_voltage_mv - v) / self.max_voltage_mv;
        if normalized <= self.min_normalized {
            return FilterVerdict::Saturated;
        }

        FilterVerdict::Accepted { x: sample.elapsed_s, y: libm::log(normalized) }
    }
}

/// Running sums of the origin-forced regression
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegressionAccumulator {
    /// Σxy
    pub sum_xy: f64,
    /// Σx²
    pub sum_x2: f64,
    /// Σy², kept for the goodness-of-fit diagnostic
    pub sum_y2: f64,
    /// Points accepted by the filter
    pub valid_points: usize,
}

impl RegressionAccumulator {
    /// Empty accumulator
    pub const fn new() -> Self {
        Self { sum_xy: 0.0, sum_x2: 0.0, sum_y2: 0.0, valid_points: 0 }
    }

    /// Add one accepted point
    pub fn add(&mut self, x: f64, y: f64) {
        self.sum_xy += x * y;
        self.sum_x2 += x * x;
        self.sum_y2 += y * y;
        self.valid_points += 1;
    }

    /// `Σxy / Σx²`, or `None` while `Σx²` is not positive
    pub fn slope(&self) -> Option<f64> {
        if self.sum_x2 > 0.0 {
            Some(self.sum_xy / self.sum_x2)
        } else {
            None
        }
    }

    /// Uncentered R² of the through-origin fit: `(Σxy)² / (Σx² · Σy²)`
    ///
    /// 1.0 for points exactly on a line through the origin.
    pub fn r_squared(&self) -> Option<f64> {
        let denom = self.sum_x2 * self.sum_y2;
        if denom > 0.0 {
            Some(self.sum_xy * self.sum_xy / denom)
        } else {
            None
        }
    }
}

/// Accumulate every sample of `series` that passes the filter chain
pub fn fit<const N: usize>(series: &SampleSeries<N>, config: &MeterConfig) -> RegressionAccumulator {
    let window = FitWindow::from_config(config);

    series
        .iter()
        .filter_map(|sample| match window.classify(sample) {
            FilterVerdict::Accepted { x, y } => Some((x, y)),
            _ => None,
        })
        .fold(RegressionAccumulator::new(), |mut acc, (x, y)| {
            acc.add(x, y);
            acc
        })
}

/// Samples of `series` that pass the filter chain, in capture order
pub fn filter_band<const N: usize>(series: &SampleSeries<N>, config: &MeterConfig) -> SampleSeries<N> {
    let window = FitWindow::from_config(config);
    let mut band = SampleSeries::new();

    for sample in series.iter().filter(|s| window.classify(s).is_accepted()) {
        // Subset of an ordered series of the same capacity: cannot fail
        let _ = band.try_push(*sample);
    }

    band
}
