//! Operator-facing text for measurement results
//!
//! `MeasurementResult` renders as the block an operator reads on the
//! serial console after each cycle:
//!
//! ```text
//! --------------------------------
//! Measured capacitance: 10.00 uF
//! Points used in calculation: 998
//! ```
//!
//! [`WriteReporter`] sends that block to any `core::fmt::Write` sink (a
//! UART wrapper, a `heapless::String`, a `String` in tests).

use core::fmt::{self, Display, Formatter, Write};

use crate::estimate::{MeasurementResult, MeasurementStatus};
use crate::traits::Reporter;

/// Separator printed before every completed measurement
pub const SEPARATOR: &str = "--------------------------------";

impl Display for MeasurementResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (self.status, self.capacitance_microfarads()) {
            (MeasurementStatus::DischargeTimeout, _) => {
                write!(f, "Error: failed to discharge. Check the circuit.")
            }
            (MeasurementStatus::Normal | MeasurementStatus::OpenCircuit, Some(uf)) => {
                writeln!(f, "{}", SEPARATOR)?;
                writeln!(f, "Measured capacitance: {:.2} uF", uf)?;
                write!(f, "Points used in calculation: {}", self.valid_points)?;
                if self.status == MeasurementStatus::OpenCircuit {
                    write!(f, "\nWarning: value very low. Open circuit?")?;
                }
                Ok(())
            }
            _ => {
                writeln!(f, "{}", SEPARATOR)?;
                write!(f, "Error: inconclusive reading or no capacitor.")
            }
        }
    }
}

/// Reporter writing each result as text to a `core::fmt::Write` sink
#[derive(Debug, Default)]
pub struct WriteReporter<W> {
    sink: W,
    write_errors: u32,
}

impl<W: Write> WriteReporter<W> {
    /// Wrap a sink
    pub fn new(sink: W) -> Self {
        Self { sink, write_errors: 0 }
    }

    /// Reports that could not be written
    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }

    /// Give the sink back
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> Reporter for WriteReporter<W> {
    fn report(&mut self, _cycle: u32, result: &MeasurementResult) {
        if writeln!(self.sink, "{}", result).is_err() {
            self.write_errors += 1;
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    fn normal(uf: f64, points: usize) -> MeasurementResult {
        MeasurementResult {
            status: MeasurementStatus::Normal,
            capacitance_farads: Some(uf * 1e-6),
            time_constant_s: Some(uf * 1e-2),
            valid_points: points,
            samples_taken: 2000,
            fit_r_squared: Some(1.0),
        }
    }

    #[test]
    fn normal_result_text() {
        let text = normal(10.004, 998).to_string();
        assert_eq!(
            text,
            "--------------------------------\n\
             Measured capacitance: 10.00 uF\n\
             Points used in calculation: 998"
        );
    }

    #[test]
    fn open_circuit_adds_warning() {
        let result = MeasurementResult { status: MeasurementStatus::OpenCircuit, ..normal(0.004, 12) };
        let text = result.to_string();
        assert!(text.contains("Measured capacitance: 0.00 uF"));
        assert!(text.ends_with("Warning: value very low. Open circuit?"));
    }

    #[test]
    fn failures_have_error_lines() {
        assert!(MeasurementResult::inconclusive(3).to_string().ends_with("Error: inconclusive reading or no capacitor."));
        assert_eq!(
            MeasurementResult::discharge_timeout().to_string(),
            "Error: failed to discharge. Check the circuit."
        );
    }

    #[test]
    fn write_reporter_appends_blocks() {
        let mut reporter = WriteReporter::new(String::new());
        reporter.report(1, &MeasurementResult::discharge_timeout());
        reporter.report(2, &normal(1.0, 100));

        let out = reporter.into_inner();
        assert_eq!(out.lines().count(), 4);
        assert!(out.starts_with("Error: failed to discharge."));
    }
}
