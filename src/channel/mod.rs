//! Channel models
//!
//! Every model takes a unit-energy symbol sequence and an injected random
//! source and returns the corrupted sequence together with the noise
//! parameters the soft demodulator needs.
//!
//! **Module Organization**:
//! - `awgn` - Additive white Gaussian noise and empirical SNR measurement
//! - `fading` - Rayleigh and Rician flat fading with perfect-CSI equalization
//! - `noise` - Box-Muller sample generation
//! - `theory` - dB conversions, Eb/N0 relations and closed-form BER

use std::fmt::Debug;
use std::str::FromStr;

use num::complex::Complex64;
use rand::RngCore;
use snafu::Snafu;

pub mod awgn;
pub mod fading;
pub mod noise;
pub mod theory;

pub use awgn::{add_noise, measure_snr, AwgnChannel};
pub use fading::{RayleighChannel, RicianChannel, DEFAULT_K_FACTOR_DB};
pub use noise::{complex_gaussian, gaussian, mean_power};
pub use theory::{
    db_to_linear, eb_n0_to_snr, erfc, linear_to_db, noise_variance_from_eb_n0, snr_to_eb_n0,
    theoretical_ber, theoretical_ber_bpsk,
};

#[derive(Debug, Snafu)]
pub enum ChannelError {
    #[snafu(display("transmitted ({transmitted}) and received ({received}) lengths differ"))]
    LengthMismatch { transmitted: usize, received: usize },

    #[snafu(display("cannot measure SNR of an empty sequence"))]
    EmptySequence,

    #[snafu(display("unknown channel model \"{name}\""))]
    UnknownModel { name: String },
}

/// Noisy symbols plus the noise statistics used to produce them
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelOutput {
    pub symbols: Vec<Complex64>,
    /// Noise variance per real dimension, as consumed by soft demodulation
    pub noise_variance: f64,
    /// Linear symbol SNR
    pub snr: f64,
    pub snr_db: f64,
}

/// A channel that corrupts a symbol sequence
pub trait Channel: Debug + Send + Sync {
    fn transmit(&self, symbols: &[Complex64], rng: &mut dyn RngCore) -> ChannelOutput;

    fn snr_db(&self) -> f64;
}

/// Channel model selector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ChannelKind {
    #[default]
    Awgn,
    Rayleigh,
    Rician { k_factor_db: f64 },
}

impl ChannelKind {
    /// Instantiate the model at a given symbol SNR
    pub fn build(&self, snr_db: f64) -> Box<dyn Channel> {
        match *self {
            ChannelKind::Awgn => Box::new(AwgnChannel::new(snr_db)),
            ChannelKind::Rayleigh => Box::new(RayleighChannel::new(snr_db)),
            ChannelKind::Rician { k_factor_db } => Box::new(RicianChannel::new(snr_db, k_factor_db)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChannelKind::Awgn => "awgn",
            ChannelKind::Rayleigh => "rayleigh",
            ChannelKind::Rician { .. } => "rician",
        }
    }
}

impl FromStr for ChannelKind {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "awgn" => Ok(ChannelKind::Awgn),
            "rayleigh" => Ok(ChannelKind::Rayleigh),
            "rician" | "rice" => Ok(ChannelKind::Rician {
                k_factor_db: DEFAULT_K_FACTOR_DB,
            }),
            _ => UnknownModelSnafu { name: s }.fail(),
        }
    }
}
