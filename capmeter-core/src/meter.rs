//! Measurement cycle driver
//!
//! `CapacitanceMeter` owns the hardware handles and runs the pipeline one
//! cycle at a time:
//!
//! ```text
//!  ┌───────────┐ timeout ┌──────────────────────────┐
//!  │ Discharge ├────────►│ DischargeTimeout result  │
//!  └─────┬─────┘         └──────────────────────────┘
//!        │ discharged
//!  ┌─────▼─────┐
//!  │  Settle   │  fixed delay, lets residual transients decay
//!  └─────┬─────┘
//!  ┌─────▼─────┐
//!  │  Acquire  │  line active, sample until 95% Vmax or budget
//!  └─────┬─────┘  line inactive again before anything else runs
//!  ┌─────▼─────┐
//!  │    Fit    │  filtered origin-forced regression
//!  └─────┬─────┘
//!  ┌─────▼─────┐
//!  │ Estimate  │  Normal / OpenCircuit / Inconclusive
//!  └───────────┘
//! ```
//!
//! Nothing survives from one cycle to the next except the configuration
//! and the handles: the sample series lives inside `measure()`.
//!
//! The outer "repeat forever" loop belongs to the caller; [`run_cycle`]
//! adds reporting and the cool-down so that loop is a one-liner.
//!
//! [`run_cycle`]: CapacitanceMeter::run_cycle

use crate::acquire::Acquirer;
use crate::config::MeterConfig;
use crate::constants::MAX_SAMPLES;
use crate::discharge::{DischargeOutcome, Discharger};
use crate::errors::{MeterError, MeterResult};
use crate::estimate::{estimate, MeasurementResult, MeasurementStatus};
use crate::fit::fit;
use crate::traits::{ChargeLine, Delay, MonotonicClock, Reporter, SenseAdc};

/// Capacitance meter over a charge line, a sense ADC and a clock
///
/// `N` is the capacity of the per-cycle sample buffer; the configured
/// sample budget may not exceed it.
pub struct CapacitanceMeter<L, A, C, const N: usize = { MAX_SAMPLES }> {
    line: L,
    adc: A,
    clock: C,
    config: MeterConfig,
    cycles: u32,
}

impl<L, A, C, const N: usize> CapacitanceMeter<L, A, C, N>
where
    L: ChargeLine,
    A: SenseAdc,
    C: MonotonicClock + Delay,
{
    /// Validate `config` and take ownership of the hardware
    ///
    /// The charge line is driven inactive straight away.
    pub fn new(mut line: L, adc: A, clock: C, config: MeterConfig) -> MeterResult<Self> {
        config.validate()?;
        if config.max_samples > N {
            return Err(MeterError::InvalidConfig {
                reason: "sample budget exceeds the sample buffer capacity",
            });
        }

        line.set_active(false)?;
        log_info!(
            "capacitance meter ready: R = {} ohm, Vmax = {} mV, budget = {} samples",
            config.known_resistance_ohms,
            config.max_voltage_mv,
            config.max_samples
        );

        Ok(Self { line, adc, clock, config, cycles: 0 })
    }

    /// Run one measurement cycle, without cool-down
    ///
    /// Measurement outcomes, including a discharge timeout, come back as
    /// `Ok`; only hardware faults are errors.
    pub fn measure(&mut self) -> MeterResult<MeasurementResult> {
        self.cycles = self.cycles.wrapping_add(1);

        let mut discharger = Discharger::new(&self.config);
        let outcome = discharger.run(&mut self.line, &mut self.adc, &mut self.clock, &self.config)?;
        if outcome == DischargeOutcome::TimedOut {
            log_warn!(
                "cycle {}: capacitor still above {} mV after {} ms",
                self.cycles,
                self.config.discharge_floor_mv,
                self.config.discharge_timeout.ticks()
            );
            return Ok(MeasurementResult::discharge_timeout());
        }
        log_debug!("cycle {}: discharged after {} polls", self.cycles, discharger.polls());

        self.clock.delay(self.config.settle_delay);

        let mut acquirer: Acquirer<N> = Acquirer::new(&self.config);
        let summary = acquirer.run(&mut self.line, &mut self.adc, &self.clock)?;
        let series = acquirer.into_series();

        let acc = fit(&series, &self.config);
        let result = estimate(&acc, &self.config).with_samples_taken(summary.samples);

        log_info!(
            "cycle {}: {:?}, {} of {} samples used ({:?})",
            self.cycles,
            result.status,
            result.valid_points,
            summary.samples,
            summary.stop
        );

        Ok(result)
    }

    /// Block for the cool-down that follows a result
    pub fn cool_down(&mut self, result: &MeasurementResult) {
        let pause = match result.status {
            MeasurementStatus::DischargeTimeout => self.config.timeout_cooldown,
            _ => self.config.cycle_cooldown,
        };
        self.clock.delay(pause);
    }

    /// Measure, hand the result to `reporter`, then cool down
    pub fn run_cycle<R: Reporter>(&mut self, reporter: &mut R) -> MeterResult<MeasurementResult> {
        let result = self.measure()?;
        reporter.report(self.cycles, &result);
        self.cool_down(&result);
        Ok(result)
    }

    /// Active configuration
    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// Cycles started so far
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Give the hardware handles back
    pub fn release(self) -> (L, A, C) {
        (self.line, self.adc, self.clock)
    }
}
