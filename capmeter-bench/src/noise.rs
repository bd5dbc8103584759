//! Random ADC noise for the simulated sense line

use capmeter_core::sim::NoiseSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform noise in `[-amplitude, amplitude]` millivolts
pub struct UniformNoise {
    rng: StdRng,
    amplitude_mv: f64,
}

impl UniformNoise {
    /// Seeded, so bench runs are repeatable
    pub fn new(seed: u64, amplitude_mv: f64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), amplitude_mv }
    }
}

impl NoiseSource for UniformNoise {
    fn next_mv(&mut self) -> f64 {
        if self.amplitude_mv <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-self.amplitude_mv..=self.amplitude_mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_within_amplitude() {
        let mut noise = UniformNoise::new(7, 2.5);
        assert!((0..1000).map(|_| noise.next_mv()).all(|n| n.abs() <= 2.5));
    }

    #[test]
    fn zero_amplitude_is_silent() {
        let mut noise = UniformNoise::new(7, 0.0);
        assert_eq!(noise.next_mv(), 0.0);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = UniformNoise::new(99, 1.0);
        let mut b = UniformNoise::new(99, 1.0);
        for _ in 0..10 {
            assert_eq!(a.next_mv(), b.next_mv());
        }
    }
}
