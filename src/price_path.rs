// Copyright 2026 Hypermesh Foundation. All rights reserved.
// MS/AF Economic Model Calculator - Random-Walk Price Path

//! Seedable geometric random walk for CLMM what-if analysis.
//! Native targets only; the engine itself is deterministic and never draws.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Lower bound applied to every generated price.
const PRICE_FLOOR: f64 = 1e-12;

pub struct PricePathGenerator {
    rng: ChaCha8Rng,
}

impl PricePathGenerator {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Standard normal draw (Box-Muller).
    pub fn next_normal(&mut self) -> f64 {
        // u1 in (0, 1] keeps ln finite
        let u1 = 1.0 - self.rng.gen::<f64>();
        let u2 = self.rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// `days` daily closes starting from `start`.
    ///
    /// `volatility` and `drift` are daily, as fractions. Each step multiplies
    /// the price by `exp(drift - vol^2/2 + vol * z)`.
    pub fn walk(&mut self, start: f64, days: u32, volatility: f64, drift: f64) -> Vec<f64> {
        let vol = volatility.max(0.0);
        let mut price = start.max(PRICE_FLOOR);
        let mut path = Vec::with_capacity(days as usize);
        for _ in 0..days {
            let z = self.next_normal();
            price = (price * (drift - 0.5 * vol * vol + vol * z).exp()).max(PRICE_FLOOR);
            path.push(price);
        }
        path
    }
}

pub fn random_walk(start: f64, days: u32, volatility: f64, drift: f64, seed: u64) -> Vec<f64> {
    PricePathGenerator::new(seed).walk(start, days, volatility, drift)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_path() {
        let a = random_walk(0.1, 100, 0.05, 0.0, 42);
        let b = random_walk(0.1, 100, 0.05, 0.0, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 100);
    }

    #[test]
    fn different_seeds_diverge() {
        let a = random_walk(0.1, 50, 0.05, 0.0, 1);
        let b = random_walk(0.1, 50, 0.05, 0.0, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn zero_volatility_follows_drift() {
        let path = random_walk(1.0, 3, 0.0, 0.01, 7);
        let expected = [0.01_f64.exp(), 0.02_f64.exp(), 0.03_f64.exp()];
        for (p, e) in path.iter().zip(expected) {
            assert!((p - e).abs() < 1e-12);
        }
    }

    #[test]
    fn prices_stay_positive() {
        let path = random_walk(0.1, 1_000, 0.5, -0.05, 9);
        assert!(path.iter().all(|p| *p > 0.0 && p.is_finite()));
    }

    #[test]
    fn normal_draws_are_roughly_standard() {
        let mut normals = PricePathGenerator::new(3);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| normals.next_normal()).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|z| (z - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.05, "var {var}");
    }
}
