//! Discharge-wait state machine
//!
//! Before every transient the capacitor must start from (nearly) zero:
//! the fit assumes `V(0) = 0`. The discharger pulls the charge line low,
//! which drains the capacitor back through the known resistor, and polls
//! the sense voltage until it reaches the noise floor.
//!
//! ```text
//!   Idle --begin()--> Draining --poll()--> Finished(Discharged)
//!                        |  ^
//!                        |  | WouldBlock
//!                        v  |
//!                      (wait poll interval) --timeout--> Finished(TimedOut)
//! ```
//!
//! A timeout is not a fault: a 4700 µF part simply takes longer than the
//! budget. The cycle reports it and the operator retries.

use crate::config::MeterConfig;
use crate::constants::US_PER_MS;
use crate::errors::{MeterError, MeterResult};
use crate::traits::{ChargeLine, Delay, MonotonicClock, SenseAdc};

/// How a discharge wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DischargeOutcome {
    /// Sense voltage reached the floor
    Discharged,
    /// Timeout elapsed first
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DischargeState {
    Idle,
    Draining { started_us: u64 },
    Finished(DischargeOutcome),
}

/// Waits for the capacitor to drain below the noise floor
#[derive(Debug, Clone)]
pub struct Discharger {
    floor_mv: f64,
    timeout_us: u64,
    state: DischargeState,
    polls: u32,
}

impl Discharger {
    /// Create a discharger from the meter configuration
    pub fn new(config: &MeterConfig) -> Self {
        Self {
            floor_mv: config.discharge_floor_mv,
            timeout_us: u64::from(config.discharge_timeout.ticks()) * US_PER_MS,
            state: DischargeState::Idle,
            polls: 0,
        }
    }

    /// Drive the charge line inactive and start the timeout window
    pub fn begin<L, C>(&mut self, line: &mut L, clock: &C) -> MeterResult<()>
    where
        L: ChargeLine,
        C: MonotonicClock,
    {
        line.set_active(false)?;
        self.state = DischargeState::Draining { started_us: clock.now_micros() };
        self.polls = 0;
        Ok(())
    }

    /// Take one reading and decide whether the wait is over
    ///
    /// `WouldBlock` means the voltage is still above the floor and the
    /// timeout has not elapsed; wait one poll interval and call again.
    /// Polling before [`begin`](Self::begin) starts the window implicitly.
    pub fn poll<A, C>(&mut self, adc: &mut A, clock: &C) -> nb::Result<DischargeOutcome, MeterError>
    where
        A: SenseAdc,
        C: MonotonicClock,
    {
        let started_us = match self.state {
            DischargeState::Finished(outcome) => return Ok(outcome),
            DischargeState::Draining { started_us } => started_us,
            DischargeState::Idle => {
                let now = clock.now_micros();
                self.state = DischargeState::Draining { started_us: now };
                now
            }
        };

        let mv = nb::block!(adc.read_millivolts())?;
        self.polls += 1;

        if mv <= self.floor_mv {
            return Ok(self.finish(DischargeOutcome::Discharged));
        }

        let elapsed_us = clock.now_micros().saturating_sub(started_us);
        if elapsed_us > self.timeout_us {
            return Ok(self.finish(DischargeOutcome::TimedOut));
        }

        Err(nb::Error::WouldBlock)
    }

    /// Run the whole wait, sleeping `config.discharge_poll_interval` between polls
    pub fn run<L, A, C>(
        &mut self,
        line: &mut L,
        adc: &mut A,
        clock: &mut C,
        config: &MeterConfig,
    ) -> MeterResult<DischargeOutcome>
    where
        L: ChargeLine,
        A: SenseAdc,
        C: MonotonicClock + Delay,
    {
        self.begin(line, &*clock)?;

        loop {
            match self.poll(adc, &*clock) {
                Ok(outcome) => return Ok(outcome),
                Err(nb::Error::WouldBlock) => clock.delay(config.discharge_poll_interval),
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
    }

    /// Outcome, once finished
    pub fn outcome(&self) -> Option<DischargeOutcome> {
        match self.state {
            DischargeState::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Sense readings taken since `begin`
    pub fn polls(&self) -> u32 {
        self.polls
    }

    fn finish(&mut self, outcome: DischargeOutcome) -> DischargeOutcome {
        self.state = DischargeState::Finished(outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{CircuitFault, RcCircuit, VirtualClock};
    use core::cell::Cell;

    #[test]
    fn empty_capacitor_discharges_on_first_poll() {
        let now = Cell::new(0);
        let circuit = RcCircuit::new(&now, 10_000.0, 10e-6);
        let mut clock = VirtualClock::new(&now);
        let config = MeterConfig::default();

        let mut discharger = Discharger::new(&config);
        let outcome = discharger
            .run(&mut circuit.charge_line(), &mut circuit.sense(), &mut clock, &config)
            .unwrap();

        assert_eq!(outcome, DischargeOutcome::Discharged);
        assert_eq!(discharger.polls(), 1);
        assert!(!circuit.is_charging());
    }

    #[test]
    fn charged_capacitor_drains_through_resistor() {
        let now = Cell::new(0);
        let circuit = RcCircuit::new(&now, 10_000.0, 10e-6).with_initial_voltage_mv(3000.0);
        let mut clock = VirtualClock::new(&now);
        let config = MeterConfig::default();

        let mut discharger = Discharger::new(&config);
        let outcome = discharger
            .run(&mut circuit.charge_line(), &mut circuit.sense(), &mut clock, &config)
            .unwrap();

        // ln(3000 / 10) ≈ 5.7 time constants of 100 ms
        assert_eq!(outcome, DischargeOutcome::Discharged);
        let elapsed_ms = now.get() / 1000;
        assert!((560..=600).contains(&elapsed_ms), "took {} ms", elapsed_ms);
    }

    #[test]
    fn stuck_sense_line_times_out() {
        let now = Cell::new(0);
        let circuit = RcCircuit::new(&now, 10_000.0, 10e-6)
            .with_fault(CircuitFault::StuckHigh { millivolts: 3300.0 });
        let mut clock = VirtualClock::new(&now);
        let config = MeterConfig::default();

        let mut discharger = Discharger::new(&config);
        let outcome = discharger
            .run(&mut circuit.charge_line(), &mut circuit.sense(), &mut clock, &config)
            .unwrap();

        assert_eq!(outcome, DischargeOutcome::TimedOut);
        assert_eq!(discharger.outcome(), Some(DischargeOutcome::TimedOut));
        assert!(now.get() > 10_000_000);
        assert!(now.get() < 10_100_000);
    }

    #[test]
    fn poll_after_finish_is_sticky() {
        let now = Cell::new(0);
        let circuit = RcCircuit::new(&now, 10_000.0, 10e-6);
        let clock = VirtualClock::new(&now);
        let mut sense = circuit.sense();

        let mut discharger = Discharger::new(&MeterConfig::default());
        assert_eq!(discharger.poll(&mut sense, &clock), Ok(DischargeOutcome::Discharged));
        assert_eq!(discharger.poll(&mut sense, &clock), Ok(DischargeOutcome::Discharged));
        assert_eq!(discharger.polls(), 1);
    }
}
