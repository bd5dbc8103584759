//! Simulated RC Bench
//!
//! A deterministic stand-in for the analog front end, used by the test
//! suite and the host bench binary. Time is virtual: it only moves when an
//! ADC conversion runs or a delay is requested, so a 10 s discharge
//! timeout costs microseconds of wall time.
//!
//! ## Model
//!
//! ```text
//!   charge pin ──[ R ]──┬── ADC
//!                       │
//!                      ═╪═ C
//!                       │
//!                      GND
//! ```
//!
//! - line active: `V -> Vsupply` with τ = RC
//! - line inactive: `V -> 0` with the same τ
//! - each ADC read samples at the start of its conversion, then advances
//!   the clock by the conversion time
//! - readings are clamped to the ADC full scale and quantized to its
//!   resolution
//!
//! Faults can be injected to exercise the unhappy paths: a sense line
//! stuck at a fixed voltage, or a capacitor shorted to ground.
//!
//! Clock and circuit share one `Cell<u64>` holding the current
//! microsecond, so everything stays `no_std` and allocation-free.

use core::cell::{Cell, RefCell};

use fugit::MillisDurationU32;

use crate::constants::{ADC_FULL_SCALE_MV, ADC_RESOLUTION_BITS, US_PER_MS, US_PER_SECOND, VOLTAGE_MAX_MV};
use crate::errors::{MeterError, MeterResult};
use crate::traits::{ChargeLine, Delay, MonotonicClock, SenseAdc};

/// Default time one ADC conversion takes (µs)
pub const DEFAULT_CONVERSION_US: u64 = 100;

/// Clock that advances only on request
#[derive(Debug, Clone, Copy)]
pub struct VirtualClock<'a> {
    now_us: &'a Cell<u64>,
}

impl<'a> VirtualClock<'a> {
    /// Create a clock reading from `now_us`
    pub fn new(now_us: &'a Cell<u64>) -> Self {
        Self { now_us }
    }

    /// Move time forward
    pub fn advance_us(&self, us: u64) {
        self.now_us.set(self.now_us.get() + us);
    }
}

impl MonotonicClock for VirtualClock<'_> {
    fn now_micros(&self) -> u64 {
        self.now_us.get()
    }
}

impl Delay for VirtualClock<'_> {
    fn delay(&mut self, duration: MillisDurationU32) {
        self.advance_us(u64::from(duration.ticks()) * US_PER_MS);
    }
}

/// Injected circuit faults
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitFault {
    /// Sense line reads a fixed voltage no matter what
    StuckHigh {
        /// Voltage reported by every read
        millivolts: f64,
    },
    /// Capacitor node tied to ground: every read is 0 mV
    ShortedCapacitor,
}

/// Additive noise on ADC readings
pub trait NoiseSource {
    /// Noise for the next reading (mV)
    fn next_mv(&mut self) -> f64;
}

/// Noise-free readings
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNoise;

impl NoiseSource for NoNoise {
    fn next_mv(&mut self) -> f64 {
        0.0
    }
}

#[derive(Debug, Clone, Copy)]
struct CircuitState {
    charging: bool,
    capacitor_mv: f64,
    updated_us: u64,
    charge_assertions: u32,
}

/// Series RC circuit driven by a GPIO and read by an ADC
#[derive(Debug)]
pub struct RcCircuit<'a> {
    now_us: &'a Cell<u64>,
    supply_mv: f64,
    resistance_ohms: f64,
    capacitance_farads: f64,
    conversion_us: u64,
    adc_levels: f64,
    full_scale_mv: f64,
    fault: Option<CircuitFault>,
    state: RefCell<CircuitState>,
}

impl<'a> RcCircuit<'a> {
    /// Create a discharged circuit with the reference supply and ADC
    pub fn new(now_us: &'a Cell<u64>, resistance_ohms: f64, capacitance_farads: f64) -> Self {
        Self {
            now_us,
            supply_mv: VOLTAGE_MAX_MV,
            resistance_ohms,
            capacitance_farads,
            conversion_us: DEFAULT_CONVERSION_US,
            adc_levels: ((1u32 << ADC_RESOLUTION_BITS) - 1) as f64,
            full_scale_mv: ADC_FULL_SCALE_MV,
            fault: None,
            state: RefCell::new(CircuitState {
                charging: false,
                capacitor_mv: 0.0,
                updated_us: now_us.get(),
                charge_assertions: 0,
            }),
        }
    }

    /// Start with the capacitor already charged
    pub fn with_initial_voltage_mv(self, mv: f64) -> Self {
        self.state.borrow_mut().capacitor_mv = mv;
        self
    }

    /// Inject a fault
    pub fn with_fault(mut self, fault: CircuitFault) -> Self {
        self.fault = Some(fault);
        self
    }

    /// Change how long one ADC conversion takes
    pub fn with_conversion_time_us(mut self, us: u64) -> Self {
        self.conversion_us = us;
        self
    }

    /// Change the charge supply voltage
    pub fn with_supply_mv(mut self, mv: f64) -> Self {
        self.supply_mv = mv;
        self
    }

    /// Time constant RC in seconds
    pub fn time_constant_s(&self) -> f64 {
        self.resistance_ohms * self.capacitance_farads
    }

    /// Handle implementing [`ChargeLine`]
    pub fn charge_line(&self) -> SimChargeLine<'_, 'a> {
        SimChargeLine { circuit: self }
    }

    /// Handle implementing [`SenseAdc`] without noise
    pub fn sense(&self) -> SimSense<'_, 'a, NoNoise> {
        self.sense_with_noise(NoNoise)
    }

    /// Handle implementing [`SenseAdc`] with additive noise
    pub fn sense_with_noise<N: NoiseSource>(&self, noise: N) -> SimSense<'_, 'a, N> {
        SimSense { circuit: self, noise }
    }

    /// Whether the charge line is currently active
    pub fn is_charging(&self) -> bool {
        self.state.borrow().charging
    }

    /// How many times the line went from inactive to active
    pub fn charge_assertions(&self) -> u32 {
        self.state.borrow().charge_assertions
    }

    /// True (unquantized) capacitor voltage right now
    pub fn capacitor_mv(&self) -> f64 {
        self.settle_to_now()
    }

    fn settle_to_now(&self) -> f64 {
        let now = self.now_us.get();
        let mut state = self.state.borrow_mut();

        let dt_s = now.saturating_sub(state.updated_us) as f64 / US_PER_SECOND;
        let target = if state.charging { self.supply_mv } else { 0.0 };
        let tau = self.time_constant_s();

        state.capacitor_mv = if tau > 0.0 {
            target + (state.capacitor_mv - target) * libm::exp(-dt_s / tau)
        } else {
            target
        };
        state.updated_us = now;
        state.capacitor_mv
    }

    fn quantize(&self, mv: f64) -> f64 {
        let clamped = mv.clamp(0.0, self.full_scale_mv);
        let code = libm::round(clamped / self.full_scale_mv * self.adc_levels);
        code * self.full_scale_mv / self.adc_levels
    }
}

/// Charge-line handle of an [`RcCircuit`]
#[derive(Debug, Clone, Copy)]
pub struct SimChargeLine<'c, 'a> {
    circuit: &'c RcCircuit<'a>,
}

impl ChargeLine for SimChargeLine<'_, '_> {
    fn set_active(&mut self, active: bool) -> MeterResult<()> {
        self.circuit.settle_to_now();

        let mut state = self.circuit.state.borrow_mut();
        if active && !state.charging {
            state.charge_assertions += 1;
        }
        state.charging = active;
        Ok(())
    }
}

/// Sense handle of an [`RcCircuit`]
#[derive(Debug)]
pub struct SimSense<'c, 'a, N> {
    circuit: &'c RcCircuit<'a>,
    noise: N,
}

impl<N: NoiseSource> SenseAdc for SimSense<'_, '_, N> {
    fn read_millivolts(&mut self) -> nb::Result<f64, MeterError> {
        let circuit = self.circuit;
        let sampled = match circuit.fault {
            Some(CircuitFault::StuckHigh { millivolts }) => millivolts,
            Some(CircuitFault::ShortedCapacitor) => 0.0,
            None => circuit.settle_to_now(),
        };
        let mv = circuit.quantize(sampled + self.noise.next_mv());

        circuit.now_us.set(circuit.now_us.get() + circuit.conversion_us);
        Ok(mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_advances_only_on_request() {
        let now = Cell::new(500);
        let mut clock = VirtualClock::new(&now);
        assert_eq!(clock.now_micros(), 500);

        clock.delay(MillisDurationU32::from_ticks(3));
        assert_eq!(clock.now_micros(), 3500);
    }

    #[test]
    fn charges_to_one_time_constant() {
        let now = Cell::new(0);
        let circuit = RcCircuit::new(&now, 10_000.0, 10e-6);
        circuit.charge_line().set_active(true).unwrap();

        now.set(100_000); // τ = 100 ms
        let expected = 3300.0 * (1.0 - libm::exp(-1.0));
        assert!((circuit.capacitor_mv() - expected).abs() < 1e-6);
        assert_eq!(circuit.charge_assertions(), 1);
    }

    #[test]
    fn reads_are_quantized_and_take_time() {
        let now = Cell::new(0);
        let circuit = RcCircuit::new(&now, 10_000.0, 1e-6).with_initial_voltage_mv(1000.3);
        // Hold the voltage still: no elapsed time before the read
        let mut sense = circuit.sense();

        let mv = nb::block!(sense.read_millivolts()).unwrap();
        let lsb = 3300.0 / 4095.0;
        assert!((mv - 1000.3).abs() <= lsb / 2.0 + 1e-9);
        assert_eq!(now.get(), DEFAULT_CONVERSION_US);
    }

    #[test]
    fn faults_override_the_model() {
        let now = Cell::new(0);
        let stuck = RcCircuit::new(&now, 10_000.0, 1e-6)
            .with_fault(CircuitFault::StuckHigh { millivolts: 3300.0 });
        assert_eq!(nb::block!(stuck.sense().read_millivolts()), Ok(3300.0));

        let shorted = RcCircuit::new(&now, 10_000.0, 1e-6)
            .with_initial_voltage_mv(2000.0)
            .with_fault(CircuitFault::ShortedCapacitor);
        assert_eq!(nb::block!(shorted.sense().read_millivolts()), Ok(0.0));
    }
}
