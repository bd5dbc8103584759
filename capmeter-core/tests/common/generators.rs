//! Synthetic sample series
//!
//! All generators produce noiseless data straight from
//! `V(t) = Vmax (1 - e^(-t/τ))` unless stated otherwise.

use capmeter_core::{Sample, SampleSeries};

/// `count` samples evenly spaced over `[0, span_s]`
pub fn ideal_charge<const N: usize>(vmax_mv: f64, tau_s: f64, count: usize, span_s: f64) -> SampleSeries<N> {
    let step = if count > 1 { span_s / (count - 1) as f64 } else { 0.0 };
    let mut series = SampleSeries::new();

    for i in 0..count {
        let t = i as f64 * step;
        let v = vmax_mv * (1.0 - (-t / tau_s).exp());
        series.try_push(Sample::new(t, v)).expect("series capacity");
    }

    series
}

/// `count` samples stuck at `mv`, `dt_s` apart
pub fn flat<const N: usize>(mv: f64, count: usize, dt_s: f64) -> SampleSeries<N> {
    let mut series = SampleSeries::new();
    for i in 0..count {
        series.try_push(Sample::new(i as f64 * dt_s, mv)).expect("series capacity");
    }
    series
}

/// Series built from explicit `(t, mv)` pairs, sorted by time first
pub fn from_pairs<const N: usize>(pairs: &[(f64, f64)]) -> SampleSeries<N> {
    let mut sorted = pairs.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut series = SampleSeries::new();
    for (t, mv) in sorted {
        series.try_push(Sample::new(t, mv)).expect("series capacity");
    }
    series
}
