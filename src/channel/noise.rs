use std::f64::consts::PI;

use num::complex::Complex64;
use rand::Rng;

/// Draw one standard normal sample with the Box-Muller transform
///
/// `u1` is redrawn while it is exactly zero so the logarithm stays finite.
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let mut u1: f64 = rng.random();
    while u1 == 0.0 {
        u1 = rng.random();
    }
    let u2: f64 = rng.random();

    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Complex noise sample with independent real and imaginary parts,
/// each with standard deviation `sigma`
pub fn complex_gaussian<R: Rng + ?Sized>(rng: &mut R, sigma: f64) -> Complex64 {
    let re = gaussian(rng) * sigma;
    let im = gaussian(rng) * sigma;
    Complex64::new(re, im)
}

/// Mean squared magnitude of a symbol sequence (0 for an empty one)
pub fn mean_power(symbols: &[Complex64]) -> f64 {
    if symbols.is_empty() {
        return 0.0;
    }
    symbols.iter().map(|s| s.norm_sqr()).sum::<f64>() / symbols.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gaussian_moments() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 50_000;
        let samples: Vec<f64> = (0..n).map(|_| gaussian(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.03, "mean {}", mean);
        assert!((var - 1.0).abs() < 0.05, "variance {}", var);
    }

    #[test]
    fn test_gaussian_is_reproducible() {
        let mut a = StdRng::seed_from_u64(1);
        let mut b = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(gaussian(&mut a), gaussian(&mut b));
        }
    }

    #[test]
    fn test_complex_gaussian_scaling() {
        let mut rng = StdRng::seed_from_u64(3);
        let sigma = 0.2;
        let n = 20_000;
        let power: f64 = (0..n)
            .map(|_| complex_gaussian(&mut rng, sigma).norm_sqr())
            .sum::<f64>()
            / n as f64;
        // E|z|^2 = 2 sigma^2
        assert!((power - 2.0 * sigma * sigma).abs() < 0.005, "power {}", power);
    }

    #[test]
    fn test_mean_power() {
        let symbols = [Complex64::new(1.0, 0.0), Complex64::new(0.0, -3.0)];
        assert_eq!(mean_power(&symbols), 5.0);
        assert_eq!(mean_power(&[]), 0.0);
    }
}
