//! Charge-transient acquisition
//!
//! Drives the charge line active and records `(elapsed, voltage)` pairs
//! as fast as the ADC allows. Timestamps are taken from the monotonic
//! clock relative to a zero reference captured just before the line goes
//! active, so the first sample sits at (or very near) `t = 0`.
//!
//! Acquisition ends on the first of:
//! - a reading at or above the charge-stop threshold (95% of Vmax)
//! - the sample budget being used up
//!
//! The line is de-asserted before [`Acquirer::poll`] reports completion,
//! and also when a hardware error aborts the run. The resistor must never
//! be left charging while the fit runs.

use crate::config::MeterConfig;
use crate::constants::{MAX_SAMPLES, US_PER_SECOND};
use crate::errors::{MeterError, MeterResult};
use crate::samples::{Sample, SampleSeries};
use crate::traits::{ChargeLine, MonotonicClock, SenseAdc};

/// Why acquisition stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopReason {
    /// A reading reached the charge-stop threshold
    ThresholdReached,
    /// The sample budget ran out first
    SampleCapReached,
}

/// Outcome of a finished acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionSummary {
    /// Samples captured
    pub samples: usize,
    /// What ended the run
    pub stop: StopReason,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AcquireState {
    Idle,
    Charging { started_us: u64 },
    Finished(AcquisitionSummary),
}

/// Samples one charge transient into an owned, bounded series
#[derive(Debug, Clone)]
pub struct Acquirer<const N: usize = { MAX_SAMPLES }> {
    stop_mv: f64,
    max_samples: usize,
    state: AcquireState,
    series: SampleSeries<N>,
}

impl<const N: usize> Acquirer<N> {
    /// Create an acquirer; the sample budget is capped at `N`
    pub fn new(config: &MeterConfig) -> Self {
        Self {
            stop_mv: config.charge_stop_mv(),
            max_samples: config.max_samples.min(N),
            state: AcquireState::Idle,
            series: SampleSeries::new(),
        }
    }

    /// Capture the zero reference and drive the charge line active
    pub fn begin<L, C>(&mut self, line: &mut L, clock: &C) -> MeterResult<()>
    where
        L: ChargeLine,
        C: MonotonicClock,
    {
        let started_us = clock.now_micros();
        line.set_active(true)?;
        self.state = AcquireState::Charging { started_us };
        Ok(())
    }

    /// Take one sample
    ///
    /// Returns `WouldBlock` while acquisition continues. Once a stop
    /// condition triggers, the line is de-asserted and the summary is
    /// returned (again on every later call).
    ///
    /// # Errors
    ///
    /// `ChargeLine` if called before [`begin`](Self::begin), otherwise any
    /// hardware or clock fault. The line is de-asserted on a best-effort
    /// basis before the error is returned.
    pub fn poll<L, A, C>(
        &mut self,
        line: &mut L,
        adc: &mut A,
        clock: &C,
    ) -> nb::Result<AcquisitionSummary, MeterError>
    where
        L: ChargeLine,
        A: SenseAdc,
        C: MonotonicClock,
    {
        let started_us = match self.state {
            AcquireState::Finished(summary) => return Ok(summary),
            AcquireState::Charging { started_us } => started_us,
            AcquireState::Idle => {
                return Err(nb::Error::Other(MeterError::ChargeLine {
                    reason: "acquisition polled before charging began",
                }))
            }
        };

        match self.sample_once(adc, clock, started_us) {
            Ok(Some(stop)) => {
                line.set_active(false)?;
                let summary = AcquisitionSummary { samples: self.series.len(), stop };
                self.state = AcquireState::Finished(summary);
                log_debug!("acquisition stopped after {} samples ({:?})", summary.samples, stop);
                Ok(summary)
            }
            Ok(None) => Err(nb::Error::WouldBlock),
            Err(e) => {
                let _ = line.set_active(false);
                log_warn!("acquisition aborted: {}", e);
                Err(nb::Error::Other(e))
            }
        }
    }

    /// Run `begin` and poll until acquisition stops
    pub fn run<L, A, C>(&mut self, line: &mut L, adc: &mut A, clock: &C) -> MeterResult<AcquisitionSummary>
    where
        L: ChargeLine,
        A: SenseAdc,
        C: MonotonicClock,
    {
        self.begin(line, clock)?;
        nb::block!(self.poll(line, adc, clock))
    }

    /// Samples captured so far
    pub fn series(&self) -> &SampleSeries<N> {
        &self.series
    }

    /// Hand over the captured series
    pub fn into_series(self) -> SampleSeries<N> {
        self.series
    }

    fn sample_once<A, C>(&mut self, adc: &mut A, clock: &C, started_us: u64) -> MeterResult<Option<StopReason>>
    where
        A: SenseAdc,
        C: MonotonicClock,
    {
        if self.series.len() >= self.max_samples {
            return Ok(Some(StopReason::SampleCapReached));
        }

        let now_us = clock.now_micros();
        if now_us < started_us {
            return Err(MeterError::ClockWentBackwards { previous_us: started_us, current_us: now_us });
        }
        let mv = nb::block!(adc.read_millivolts())?;

        let elapsed_s = (now_us - started_us) as f64 / US_PER_SECOND;
        self.series.try_push(Sample::new(elapsed_s, mv))?;

        if mv >= self.stop_mv {
            Ok(Some(StopReason::ThresholdReached))
        } else if self.series.len() >= self.max_samples {
            Ok(Some(StopReason::SampleCapReached))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{CircuitFault, RcCircuit, VirtualClock};
    use core::cell::Cell;

    #[test]
    fn stops_at_threshold_and_releases_line() {
        let now = Cell::new(0);
        let circuit = RcCircuit::new(&now, 10_000.0, 1e-6); // τ = 10 ms
        let clock = VirtualClock::new(&now);

        let mut acquirer: Acquirer = Acquirer::new(&MeterConfig::default());
        let summary = acquirer
            .run(&mut circuit.charge_line(), &mut circuit.sense(), &clock)
            .unwrap();

        // 95% is reached at ~3τ = 30 ms, i.e. ~300 reads of 100 µs
        assert_eq!(summary.stop, StopReason::ThresholdReached);
        assert!((295..=305).contains(&summary.samples), "{} samples", summary.samples);
        assert!(!circuit.is_charging());
        assert_eq!(circuit.charge_assertions(), 1);

        let series = acquirer.into_series();
        assert_eq!(series.as_slice()[0].elapsed_s, 0.0);
        assert!(series.last().unwrap().millivolts >= 3135.0);
    }

    #[test]
    fn stops_at_sample_budget() {
        let now = Cell::new(0);
        let circuit = RcCircuit::new(&now, 10_000.0, 100e-6); // τ = 1 s
        let clock = VirtualClock::new(&now);
        let config = MeterConfig::default().with_max_samples(50);

        let mut acquirer: Acquirer<64> = Acquirer::new(&config);
        let summary = acquirer
            .run(&mut circuit.charge_line(), &mut circuit.sense(), &clock)
            .unwrap();

        assert_eq!(summary, AcquisitionSummary { samples: 50, stop: StopReason::SampleCapReached });
        assert!(!circuit.is_charging());
    }

    #[test]
    fn budget_is_capped_by_capacity() {
        let now = Cell::new(0);
        let circuit = RcCircuit::new(&now, 10_000.0, 100e-6);
        let clock = VirtualClock::new(&now);

        let mut acquirer: Acquirer<16> = Acquirer::new(&MeterConfig::default());
        let summary = acquirer
            .run(&mut circuit.charge_line(), &mut circuit.sense(), &clock)
            .unwrap();

        assert_eq!(summary.samples, 16);
        assert!(acquirer.series().is_full());
    }

    #[test]
    fn timestamps_are_monotonic() {
        let now = Cell::new(1_234_567);
        let circuit = RcCircuit::new(&now, 10_000.0, 1e-6);
        let clock = VirtualClock::new(&now);

        let mut acquirer: Acquirer = Acquirer::new(&MeterConfig::default());
        acquirer
            .run(&mut circuit.charge_line(), &mut circuit.sense(), &clock)
            .unwrap();

        let series = acquirer.series().as_slice();
        assert!(series.windows(2).all(|w| w[0].elapsed_s <= w[1].elapsed_s));
        assert!((series[1].elapsed_s - 100e-6).abs() < 1e-12);
    }

    #[test]
    fn shorted_capacitor_never_reaches_threshold() {
        let now = Cell::new(0);
        let circuit = RcCircuit::new(&now, 10_000.0, 1e-6).with_fault(CircuitFault::ShortedCapacitor);
        let clock = VirtualClock::new(&now);

        let mut acquirer: Acquirer = Acquirer::new(&MeterConfig::default());
        let summary = acquirer
            .run(&mut circuit.charge_line(), &mut circuit.sense(), &clock)
            .unwrap();

        assert_eq!(summary.stop, StopReason::SampleCapReached);
        assert_eq!(summary.samples, 2000);
        assert!(acquirer.series().iter().all(|s| s.millivolts == 0.0));
    }

    #[test]
    fn polling_before_begin_is_an_error() {
        let now = Cell::new(0);
        let circuit = RcCircuit::new(&now, 10_000.0, 1e-6);
        let clock = VirtualClock::new(&now);

        let mut acquirer: Acquirer<8> = Acquirer::new(&MeterConfig::default());
        let result = acquirer.poll(&mut circuit.charge_line(), &mut circuit.sense(), &clock);
        assert!(matches!(result, Err(nb::Error::Other(MeterError::ChargeLine { .. }))));
    }
}
