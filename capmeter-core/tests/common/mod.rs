//! Shared fixtures for integration tests
//!
//! - synthetic charge curves from the ideal RC model
//! - a reporter that records what it was given

#![allow(dead_code)]

pub mod generators;

use capmeter_core::{MeasurementResult, Reporter};

/// Reporter that keeps every result it receives
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub reports: Vec<(u32, MeasurementResult)>,
}

impl Reporter for RecordingReporter {
    fn report(&mut self, cycle: u32, result: &MeasurementResult) {
        self.reports.push((cycle, *result));
    }
}

/// Relative error of `measured` against `expected`
pub fn relative_error(measured: f64, expected: f64) -> f64 {
    ((measured - expected) / expected).abs()
}
