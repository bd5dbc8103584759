//! Capacitance meter bench
//!
//! Drives the measurement pipeline against simulated RC circuits and
//! prints the operator report after every cycle, the way the firmware
//! does on its serial console. Each scenario runs a few back-to-back
//! cycles so the discharge path is exercised with a charged capacitor.
//!
//! Logging goes through `env_logger`; `RUST_LOG=debug` shows per-phase
//! details.

mod noise;

use core::cell::Cell;

use capmeter_core::sim::{CircuitFault, RcCircuit, VirtualClock};
use capmeter_core::{CapacitanceMeter, MeasurementResult, MeterConfig, MeterResult, Reporter};
use log::{error, info};

use noise::UniformNoise;

/// Cycles run per scenario
const CYCLES_PER_SCENARIO: u32 = 2;

/// Peak ADC noise added to every reading (mV)
const ADC_NOISE_MV: f64 = 2.0;

struct Scenario {
    label: &'static str,
    capacitance_uf: f64,
    fault: Option<CircuitFault>,
}

const SCENARIOS: &[Scenario] = &[
    Scenario { label: "100 nF ceramic", capacitance_uf: 0.1, fault: None },
    Scenario { label: "1 uF film", capacitance_uf: 1.0, fault: None },
    Scenario { label: "10 uF electrolytic", capacitance_uf: 10.0, fault: None },
    Scenario { label: "470 uF electrolytic", capacitance_uf: 470.0, fault: None },
    Scenario { label: "no capacitor", capacitance_uf: 1e-5, fault: None },
    Scenario { label: "shorted capacitor", capacitance_uf: 10.0, fault: Some(CircuitFault::ShortedCapacitor) },
    Scenario {
        label: "sense line stuck high",
        capacitance_uf: 10.0,
        fault: Some(CircuitFault::StuckHigh { millivolts: 3300.0 }),
    },
];

/// Prints each report under a scenario header
struct ConsoleReporter {
    label: &'static str,
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, cycle: u32, result: &MeasurementResult) {
        println!("[{} | cycle {}]", self.label, cycle);
        println!("{}", result);
        if let (Some(tau), Some(r2)) = (result.time_constant_s, result.fit_r_squared) {
            println!("  tau = {:.6} s, R^2 = {:.6}, samples = {}", tau, r2, result.samples_taken);
        }
    }
}

fn run_scenario(scenario: &Scenario, seed: u64) -> MeterResult<()> {
    let config = MeterConfig::default();
    let now_us = Cell::new(0);

    let mut circuit = RcCircuit::new(&now_us, config.known_resistance_ohms, scenario.capacitance_uf * 1e-6);
    if let Some(fault) = scenario.fault {
        circuit = circuit.with_fault(fault);
    }

    let mut meter: CapacitanceMeter<_, _, _> = CapacitanceMeter::new(
        circuit.charge_line(),
        circuit.sense_with_noise(UniformNoise::new(seed, ADC_NOISE_MV)),
        VirtualClock::new(&now_us),
        config,
    )?;

    let mut reporter = ConsoleReporter { label: scenario.label };
    for _ in 0..CYCLES_PER_SCENARIO {
        meter.run_cycle(&mut reporter)?;
    }

    info!(
        "{}: {} cycles in {:.1} s of bench time",
        scenario.label,
        meter.cycles(),
        now_us.get() as f64 / 1e6
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("capmeter bench v{}", capmeter_core::VERSION);
    println!("--- Capacitance meter started ---");

    let mut failures = 0;
    for (seed, scenario) in (1u64..).zip(SCENARIOS) {
        if let Err(e) = run_scenario(scenario, seed) {
            error!("{}: {}", scenario.label, e);
            failures += 1;
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}
