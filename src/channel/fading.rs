//! Flat fading channels with perfect-CSI equalization
//!
//! Each symbol sees an independent complex gain `h`. Noise is scaled to the
//! power of the faded signal, and the receiver divides the gain back out
//! (`y * conj(h) / |h|^2`), so downstream stages see equalized symbols whose
//! effective noise grows in deep fades.

use num::complex::Complex64;
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;
use tracing::trace;

use super::noise::{complex_gaussian, mean_power};
use super::theory::db_to_linear;
use super::{Channel, ChannelOutput};

/// Floor on |h|^2 during equalization
const MIN_GAIN_POWER: f64 = 1e-10;

/// Default Rician K-factor (LOS to scattered power ratio) in dB
pub const DEFAULT_K_FACTOR_DB: f64 = 10.0;

/// Apply per-symbol gains, add noise at `snr_db` relative to the faded
/// signal power, then equalize
fn fade_and_equalize<R: Rng + ?Sized>(
    symbols: &[Complex64],
    gains: &[Complex64],
    snr_db: f64,
    rng: &mut R,
) -> ChannelOutput {
    let snr = db_to_linear(snr_db);

    let faded: Vec<Complex64> = symbols.iter().zip(gains).map(|(&s, &h)| s * h).collect();
    let noise_var = mean_power(&faded) / snr;
    let sigma = (noise_var / 2.0).sqrt();

    let equalized = faded
        .iter()
        .zip(gains)
        .map(|(&f, &h)| {
            let received = f + complex_gaussian(rng, sigma);
            received * h.conj() / h.norm_sqr().max(MIN_GAIN_POWER)
        })
        .collect();

    ChannelOutput {
        symbols: equalized,
        noise_variance: 1.0 / (2.0 * snr),
        snr,
        snr_db,
    }
}

/// Rayleigh fading: `h ~ CN(0, 1)`, no line of sight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayleighChannel {
    snr_db: f64,
}

impl RayleighChannel {
    pub fn new(snr_db: f64) -> Self {
        RayleighChannel { snr_db }
    }

    /// Draw `len` unit-power Rayleigh gains
    pub fn gains<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Vec<Complex64> {
        let std = std::f64::consts::FRAC_1_SQRT_2;
        (0..len)
            .map(|_| {
                let re: f64 = rng.sample(StandardNormal);
                let im: f64 = rng.sample(StandardNormal);
                Complex64::new(re * std, im * std)
            })
            .collect()
    }
}

impl Channel for RayleighChannel {
    fn transmit(&self, symbols: &[Complex64], rng: &mut dyn RngCore) -> ChannelOutput {
        let gains = self.gains(symbols.len(), rng);
        trace!(snr_db = self.snr_db, n = symbols.len(), "rayleigh fading");
        fade_and_equalize(symbols, &gains, self.snr_db, rng)
    }

    fn snr_db(&self) -> f64 {
        self.snr_db
    }
}

/// Rician fading: fixed line-of-sight term plus a Rayleigh scatter term
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RicianChannel {
    snr_db: f64,
    k_factor_db: f64,
}

impl RicianChannel {
    pub fn new(snr_db: f64, k_factor_db: f64) -> Self {
        RicianChannel { snr_db, k_factor_db }
    }

    pub fn k_factor_db(&self) -> f64 {
        self.k_factor_db
    }

    /// Draw `len` unit-power Rician gains
    pub fn gains<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Vec<Complex64> {
        let k = db_to_linear(self.k_factor_db);
        let los = (k / (k + 1.0)).sqrt();
        let scatter_std = (1.0 / (2.0 * (k + 1.0))).sqrt();
        (0..len)
            .map(|_| {
                let re: f64 = rng.sample(StandardNormal);
                let im: f64 = rng.sample(StandardNormal);
                Complex64::new(los + re * scatter_std, im * scatter_std)
            })
            .collect()
    }
}

impl Channel for RicianChannel {
    fn transmit(&self, symbols: &[Complex64], rng: &mut dyn RngCore) -> ChannelOutput {
        let gains = self.gains(symbols.len(), rng);
        trace!(snr_db = self.snr_db, k_factor_db = self.k_factor_db, n = symbols.len(), "rician fading");
        fade_and_equalize(symbols, &gains, self.snr_db, rng)
    }

    fn snr_db(&self) -> f64 {
        self.snr_db
    }
}
