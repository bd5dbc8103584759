//! Bounded Sample Series for One Charge Transient
//!
//! ## Overview
//!
//! A `SampleSeries` is the only data handed from the acquirer to the curve
//! fitter: `(elapsed seconds, millivolts)` pairs in capture order. It is
//! owned by one measurement cycle and dropped with it, so nothing leaks
//! from one transient into the next.
//!
//! ## Why `heapless::Vec`?
//!
//! The sample budget is known at compile time and the target has no
//! allocator. Unlike a ring buffer, a full series must *not* overwrite
//! old data: the earliest samples carry the steepest part of the curve.
//! `heapless::Vec` gives exactly that, an append-only array that refuses
//! pushes past capacity.
//!
//! ## Invariants
//!
//! - `len() <= N`
//! - `elapsed_s` is non-decreasing in insertion order
//!
//! Both are enforced by [`SampleSeries::try_push`].
//!
//! ```rust
//! use capmeter_core::{Sample, SampleSeries};
//!
//! let mut series: SampleSeries<4> = SampleSeries::new();
//! series.try_push(Sample::new(0.0, 0.0))?;
//! series.try_push(Sample::new(0.001, 120.0))?;
//!
//! assert!(series.try_push(Sample::new(0.0005, 60.0)).is_err()); // time went backwards
//! assert_eq!(series.len(), 2);
//! # Ok::<(), capmeter_core::MeterError>(())
//! ```

use heapless::Vec;

use crate::constants::{MAX_SAMPLES, US_PER_SECOND};
use crate::errors::{MeterError, MeterResult};

/// One reading of the charge transient
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// Seconds since charging started
    pub elapsed_s: f64,
    /// Capacitor voltage in millivolts
    pub millivolts: f64,
}

impl Sample {
    /// Create a sample
    pub const fn new(elapsed_s: f64, millivolts: f64) -> Self {
        Self { elapsed_s, millivolts }
    }
}

/// Time-ordered samples of one transient, at most `N` of them
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSeries<const N: usize = { MAX_SAMPLES }> {
    samples: Vec<Sample, N>,
}

impl<const N: usize> SampleSeries<N> {
    /// Create an empty series
    pub const fn new() -> Self {
        Self { samples: Vec::new() }
    }

    /// Append a sample
    ///
    /// Fails with `SeriesFull` when `N` samples are stored, and with
    /// `ClockWentBackwards` when `sample` is older than the last one.
    pub fn try_push(&mut self, sample: Sample) -> MeterResult<()> {
        if let Some(last) = self.samples.last() {
            if sample.elapsed_s < last.elapsed_s {
                return Err(MeterError::ClockWentBackwards {
                    previous_us: seconds_to_micros(last.elapsed_s),
                    current_us: seconds_to_micros(sample.elapsed_s),
                });
            }
        }

        self.samples
            .push(sample)
            .map_err(|_| MeterError::SeriesFull { capacity: N })
    }

    /// Number of stored samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no sample was stored
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Check if the series reached its capacity
    pub fn is_full(&self) -> bool {
        self.samples.is_full()
    }

    /// Compile-time capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Most recent sample
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Samples in capture order
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    /// Iterate in capture order
    pub fn iter(&self) -> core::slice::Iter<'_, Sample> {
        self.samples.iter()
    }
}

impl<const N: usize> Default for SampleSeries<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> IntoIterator for &'a SampleSeries<N> {
    type Item = &'a Sample;
    type IntoIter = core::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn seconds_to_micros(seconds: f64) -> u64 {
    libm::round(seconds * US_PER_SECOND) as u64
}
