//! Seeded Gaussian effort noise.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Gaussian noise source for joint efforts.
///
/// A zero standard deviation draws nothing from the generator, so worlds
/// without noise are unaffected by the seed.
pub(crate) struct EffortNoise {
    rng: ChaCha8Rng,
    std_dev: f64,
}

impl EffortNoise {
    pub(crate) fn new(std_dev: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(0),
            std_dev,
        }
    }

    pub(crate) fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub(crate) fn sample(&mut self) -> f64 {
        if self.std_dev == 0.0 {
            return 0.0;
        }
        self.std_dev * self.box_muller()
    }

    /// Uniform sample in `[0, 1)` with 53 bits of precision.
    fn unit(&mut self) -> f64 {
        (self.rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Standard normal sample via the Box-Muller transform.
    fn box_muller(&mut self) -> f64 {
        let u1 = self.unit().max(1e-300);
        let u2 = self.unit();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_noise_is_silent() {
        let mut n = EffortNoise::new(0.0);
        assert!((0..100).all(|_| n.sample() == 0.0));
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = EffortNoise::new(0.5);
        let mut b = EffortNoise::new(0.5);
        a.reseed(42);
        b.reseed(42);
        for _ in 0..64 {
            assert_eq!(a.sample().to_bits(), b.sample().to_bits());
        }
    }

    #[test]
    fn different_seed_different_sequence() {
        let mut a = EffortNoise::new(0.5);
        let mut b = EffortNoise::new(0.5);
        a.reseed(1);
        b.reseed(2);
        let xs: Vec<f64> = (0..8).map(|_| a.sample()).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.sample()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn sample_moments_are_plausible() {
        let mut n = EffortNoise::new(2.0);
        n.reseed(7);
        let samples: Vec<f64> = (0..20_000).map(|_| n.sample()).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 0.1, "mean {mean}");
        assert!((var.sqrt() - 2.0).abs() < 0.1, "std {}", var.sqrt());
    }
}
