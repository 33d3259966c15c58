//! Digital communication link simulation
//!
//! Bits are encoded with an LDPC or polar code, mapped onto a QPSK or
//! square QAM constellation, corrupted by an AWGN or flat-fading channel,
//! demodulated to LLRs, decoded and scored.
//!
//! **Module Organization**:
//! - `crc` - CRC-16 for CRC-aided list decoding
//! - `modulation` - Gray-mapped constellations and hard/soft demodulation
//! - `channel` - AWGN, Rayleigh and Rician channels plus theoretical BER
//! - `coding` - Code and decoder traits shared by all codes
//! - `ldpc` - Systematic LDPC encoding with hard and belief-propagation decoding
//! - `polar` - Polar encoding with hard and successive-cancellation list decoding
//! - `metrics` - BER, BLER, EVM, PSNR, SSIM and related measures
//! - `info_theory` - Entropy, mutual information and capacity estimates
//! - `simulation` - End-to-end link runs, SNR sweeps and Monte Carlo

pub mod channel;
pub mod coding;
pub mod crc;
pub mod info_theory;
pub mod ldpc;
pub mod metrics;
pub mod modulation;
pub mod polar;
pub mod simulation;
pub mod tracing_init;
pub mod util;

pub use channel::{Channel, ChannelKind, ChannelOutput};
pub use coding::{ChannelCode, Decoder};
pub use ldpc::LdpcCoder;
pub use modulation::{Demodulator, Modulator, Scheme};
pub use polar::PolarCoder;
pub use simulation::{
    run_monte_carlo, run_snr_sweep, CodeConfig, DecodingMode, LinkConfig, LinkReport,
    LinkSimulator, SimulationError, SnrSetting, SweepPoint,
};
