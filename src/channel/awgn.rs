//! Additive white Gaussian noise channel

use num::complex::Complex64;
use rand::{Rng, RngCore};
use snafu::ensure;
use tracing::trace;

use super::noise::{complex_gaussian, mean_power};
use super::theory::{db_to_linear, eb_n0_to_snr, linear_to_db};
use super::{Channel, ChannelError, ChannelOutput, EmptySequenceSnafu, LengthMismatchSnafu};

/// AWGN channel at a fixed symbol SNR
///
/// Symbols are assumed to have unit mean energy, so the per-dimension noise
/// variance is `1 / (2 * snr)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AwgnChannel {
    snr_db: f64,
}

impl AwgnChannel {
    pub fn new(snr_db: f64) -> Self {
        AwgnChannel { snr_db }
    }

    /// Channel realizing a given Eb/N0 for a modulation and code rate
    pub fn from_eb_n0(eb_n0_db: f64, bits_per_symbol: usize, code_rate: f64) -> Self {
        AwgnChannel::new(eb_n0_to_snr(eb_n0_db, bits_per_symbol, code_rate))
    }

    pub fn snr_db(&self) -> f64 {
        self.snr_db
    }

    /// Linear symbol SNR
    pub fn snr(&self) -> f64 {
        db_to_linear(self.snr_db)
    }

    /// Noise variance per real dimension
    pub fn noise_variance(&self) -> f64 {
        1.0 / (2.0 * self.snr())
    }

    /// Add independent Gaussian noise to both components of every symbol
    pub fn add_noise<R: Rng + ?Sized>(&self, symbols: &[Complex64], rng: &mut R) -> ChannelOutput {
        let noise_variance = self.noise_variance();
        let sigma = noise_variance.sqrt();
        trace!(snr_db = self.snr_db, noise_variance, n = symbols.len(), "adding awgn");

        let noisy = symbols
            .iter()
            .map(|&s| s + complex_gaussian(rng, sigma))
            .collect();

        ChannelOutput {
            symbols: noisy,
            noise_variance,
            snr: self.snr(),
            snr_db: self.snr_db,
        }
    }
}

impl Channel for AwgnChannel {
    fn transmit(&self, symbols: &[Complex64], rng: &mut dyn RngCore) -> ChannelOutput {
        self.add_noise(symbols, rng)
    }

    fn snr_db(&self) -> f64 {
        self.snr_db
    }
}

/// Add AWGN at `snr_db` to a symbol sequence
pub fn add_noise<R: Rng + ?Sized>(symbols: &[Complex64], snr_db: f64, rng: &mut R) -> ChannelOutput {
    AwgnChannel::new(snr_db).add_noise(symbols, rng)
}

/// Empirical SNR in dB between transmitted and received symbols
///
/// Signal power is the mean squared magnitude of `transmitted`; noise power
/// is the mean squared magnitude of `received - transmitted`. A noiseless
/// pair measures `+inf`.
pub fn measure_snr(transmitted: &[Complex64], received: &[Complex64]) -> Result<f64, ChannelError> {
    ensure!(
        transmitted.len() == received.len(),
        LengthMismatchSnafu {
            transmitted: transmitted.len(),
            received: received.len(),
        }
    );
    ensure!(!transmitted.is_empty(), EmptySequenceSnafu);

    let signal_power = mean_power(transmitted);
    let noise_power = transmitted
        .iter()
        .zip(received)
        .map(|(&tx, &rx)| (rx - tx).norm_sqr())
        .sum::<f64>()
        / transmitted.len() as f64;

    Ok(linear_to_db(signal_power / noise_power))
}
