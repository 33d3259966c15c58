//! End-to-end link simulation
//!
//! A [`LinkSimulator`] is built once from a [`LinkConfig`] and then run on
//! any number of payloads. Each run performs:
//!
//! 1. Channel encoding (LDPC, polar or none), block by block
//! 2. Modulation onto the configured constellation
//! 3. The channel (AWGN or fading) with an injected random source
//! 4. Soft demodulation to LLRs
//! 5. Decoding with the configured decoder
//! 6. Scoring against the transmitted payload
//!
//! **Module Organization**:
//! - `sweep` - Parallel SNR sweeps and Monte Carlo runs

use bitvec::prelude::*;
use num::complex::Complex64;
use rand::RngCore;
use snafu::{ensure, ResultExt, Snafu};
use tracing::{debug, info};

use crate::channel::{
    eb_n0_to_snr, measure_snr, snr_to_eb_n0, theoretical_ber, Channel, ChannelKind,
};
use crate::coding::{decode_blocks, encode_blocks, ChannelCode, CodingError, Decoder, Uncoded};
use crate::info_theory::{channel_capacity, entropy, mutual_information};
use crate::ldpc::{LdpcCoder, DEFAULT_BLOCK_LENGTH, DEFAULT_MAX_ITERATIONS};
use crate::metrics::{bit_error_rate, bit_errors, block_error_rate, evm, symbol_error_rate};
use crate::modulation::{Demodulator, Modulator, Scheme};
use crate::polar::{PolarCoder, DEFAULT_LIST_SIZE};

mod sweep;

pub use sweep::{run_monte_carlo, run_snr_sweep, SweepPoint};

/// Block length used for the uncoded path
const UNCODED_BLOCK_LEN: usize = 1024;

#[derive(Debug, Snafu)]
pub enum SimulationError {
    #[snafu(display("invalid code parameters"))]
    Code { source: CodingError },

    #[snafu(display("invalid configuration: {reason}"))]
    InvalidConfig { reason: String },
}

/// Channel code selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CodeConfig {
    Ldpc { rate: f64, block_length: usize },
    Polar { n: usize, k: usize },
    Uncoded,
}

impl Default for CodeConfig {
    fn default() -> Self {
        CodeConfig::Ldpc {
            rate: 0.5,
            block_length: DEFAULT_BLOCK_LENGTH,
        }
    }
}

/// Operating point, either per-symbol SNR or per-information-bit Eb/N0
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnrSetting {
    SnrDb(f64),
    EbN0Db(f64),
}

impl SnrSetting {
    pub fn value(&self) -> f64 {
        match *self {
            SnrSetting::SnrDb(v) | SnrSetting::EbN0Db(v) => v,
        }
    }

    /// Same kind of setting at a different value
    pub fn with_value(&self, value: f64) -> SnrSetting {
        match self {
            SnrSetting::SnrDb(_) => SnrSetting::SnrDb(value),
            SnrSetting::EbN0Db(_) => SnrSetting::EbN0Db(value),
        }
    }

    /// Resolve to symbol SNR in dB
    pub fn snr_db(&self, bits_per_symbol: usize, code_rate: f64) -> f64 {
        match *self {
            SnrSetting::SnrDb(snr) => snr,
            SnrSetting::EbN0Db(eb_n0) => eb_n0_to_snr(eb_n0, bits_per_symbol, code_rate),
        }
    }
}

impl Default for SnrSetting {
    fn default() -> Self {
        SnrSetting::SnrDb(10.0)
    }
}

/// Hard-decision baselines or the iterative/list decoders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodingMode {
    #[default]
    HardDecision,
    Iterative,
}

/// Link simulation configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    pub code: CodeConfig,
    pub scheme: Scheme,
    pub channel: ChannelKind,
    pub snr: SnrSetting,
    pub decoding: DecodingMode,
    /// Belief-propagation iteration cap (LDPC, iterative mode)
    pub max_iterations: usize,
    /// Surviving paths in list decoding (polar, iterative mode)
    pub list_size: usize,
    /// Reserve 16 polar information bits for a CRC and select list paths by it
    pub crc_aided: bool,
    /// Base seed for sweeps and Monte Carlo runs
    pub seed: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            code: CodeConfig::default(),
            scheme: Scheme::Qpsk,
            channel: ChannelKind::Awgn,
            snr: SnrSetting::default(),
            decoding: DecodingMode::HardDecision,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            list_size: DEFAULT_LIST_SIZE,
            crc_aided: false,
            seed: 42,
        }
    }
}

impl LinkConfig {
    /// Check settings that code construction does not
    pub fn validate(&self) -> Result<(), SimulationError> {
        ensure!(
            self.snr.value().is_finite(),
            InvalidConfigSnafu {
                reason: format!("operating point {} dB is not finite", self.snr.value()),
            }
        );
        ensure!(
            self.list_size > 0,
            InvalidConfigSnafu {
                reason: "list size must be at least 1",
            }
        );
        ensure!(
            !self.crc_aided || matches!(self.code, CodeConfig::Polar { .. }),
            InvalidConfigSnafu {
                reason: "CRC-aided decoding needs a polar code",
            }
        );
        if let ChannelKind::Rician { k_factor_db } = self.channel {
            ensure!(
                k_factor_db.is_finite(),
                InvalidConfigSnafu {
                    reason: "Rician K-factor must be finite",
                }
            );
        }
        Ok(())
    }
}

/// Everything measured in one run
#[derive(Debug, Clone, PartialEq)]
pub struct LinkReport {
    pub payload_bits: usize,
    pub coded_bits: usize,
    pub symbols: usize,
    pub code_rate: f64,
    pub snr_db: f64,
    pub eb_n0_db: f64,
    pub noise_variance: f64,
    /// SNR measured between transmitted and received symbols
    pub measured_snr_db: Option<f64>,
    /// Hard-decision BER of the coded bits before decoding
    pub channel_ber: f64,
    /// Symbol error rate of the coded bits before decoding
    pub channel_ser: f64,
    pub bit_errors: usize,
    pub ber: f64,
    /// Fraction of message blocks with at least one error
    pub bler: f64,
    /// EVM of the received symbols in percent
    pub evm_percent: Option<f64>,
    /// Uncoded theoretical BER at the same Eb/N0
    pub theoretical_ber: f64,
    pub source_entropy: f64,
    /// Empirical I(X; X_hat) between payload and decoded bits
    pub mutual_information: f64,
    /// Shannon capacity at the channel SNR, bits per symbol
    pub capacity: f64,
    pub decoded: BitVec<u8, Msb0>,
}

/// A configured transmit/receive chain
#[derive(Debug)]
pub struct LinkSimulator {
    config: LinkConfig,
    code: Box<dyn ChannelCode>,
    decoder: Box<dyn Decoder>,
    modulator: Modulator,
    demodulator: Demodulator,
    channel: Box<dyn Channel>,
    snr_db: f64,
}

impl LinkSimulator {
    pub fn new(config: LinkConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let iterative = config.decoding == DecodingMode::Iterative;

        let (code, decoder): (Box<dyn ChannelCode>, Box<dyn Decoder>) = match config.code {
            CodeConfig::Ldpc { rate, block_length } => {
                let coder = LdpcCoder::new(rate, block_length).context(CodeSnafu)?;
                let decoder = coder.decoder(iterative, config.max_iterations);
                (Box::new(coder), decoder)
            }
            CodeConfig::Polar { n, k } => {
                let coder = if config.crc_aided {
                    PolarCoder::with_crc(n, k)
                } else {
                    PolarCoder::new(n, k)
                }
                .context(CodeSnafu)?;
                let decoder = coder.decoder(iterative, config.list_size);
                (Box::new(coder), decoder)
            }
            CodeConfig::Uncoded => {
                let code = Uncoded::new(UNCODED_BLOCK_LEN);
                (Box::new(code), Box::new(code.decoder()))
            }
        };

        let bps = config.scheme.bits_per_symbol();
        let snr_db = config.snr.snr_db(bps, code.rate());
        let channel = config.channel.build(snr_db);

        info!(
            code = ?config.code,
            scheme = config.scheme.name(),
            channel = config.channel.name(),
            snr_db,
            decoding = ?config.decoding,
            "link simulator ready"
        );

        Ok(LinkSimulator {
            modulator: Modulator::new(config.scheme),
            demodulator: Demodulator::new(config.scheme),
            config,
            code,
            decoder,
            channel,
            snr_db,
        })
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn code(&self) -> &dyn ChannelCode {
        self.code.as_ref()
    }

    pub fn code_rate(&self) -> f64 {
        self.code.rate()
    }

    /// Symbol SNR the channel runs at
    pub fn snr_db(&self) -> f64 {
        self.snr_db
    }

    pub fn eb_n0_db(&self) -> f64 {
        snr_to_eb_n0(self.snr_db, self.config.scheme.bits_per_symbol(), self.code_rate())
    }

    /// Push one payload through the link
    pub fn run(&self, bits: &BitSlice<u8, Msb0>, rng: &mut dyn RngCore) -> LinkReport {
        let bps = self.config.scheme.bits_per_symbol();

        let coded = encode_blocks(self.code.as_ref(), bits);
        debug!(payload = bits.len(), coded = coded.len(), "encoded");

        let tx = self.modulator.modulate(&coded);
        debug!(symbols = tx.len(), "modulated");

        let out = self.channel.transmit(&tx, rng);
        debug!(snr_db = out.snr_db, noise_variance = out.noise_variance, "channel applied");

        let llrs = self.demodulator.demodulate_soft(&out.symbols, out.noise_variance);
        let hard = self.demodulator.demodulate_hard(&out.symbols);
        let (channel_ber, channel_ser) = pre_decoding_rates(&coded, &hard, bps);
        debug!(llrs = llrs.len(), channel_ber, "demodulated");

        let mut decoded = decode_blocks(self.decoder.as_ref(), self.code.codeword_len(), &llrs);
        decoded.truncate(bits.len());
        debug!(decoded = decoded.len(), "decoded");

        self.score(bits, coded.len(), &tx, &out.symbols, out.noise_variance, channel_ber, channel_ser, decoded)
    }

    #[allow(clippy::too_many_arguments)]
    fn score(
        &self,
        bits: &BitSlice<u8, Msb0>,
        coded_bits: usize,
        tx: &[Complex64],
        rx: &[Complex64],
        noise_variance: f64,
        channel_ber: f64,
        channel_ser: f64,
        decoded: BitVec<u8, Msb0>,
    ) -> LinkReport {
        let len = bits.len().min(decoded.len());
        let (sent, got) = (&bits[..len], &decoded[..len]);

        let errors = bit_errors(sent, got).unwrap_or(0);
        let ber = bit_error_rate(sent, got).unwrap_or(0.0);
        let bler = block_error_rate(sent, got, self.code.message_len()).unwrap_or(0.0);

        let sent_u8: Vec<u8> = sent.iter().by_vals().map(u8::from).collect();
        let got_u8: Vec<u8> = got.iter().by_vals().map(u8::from).collect();
        let mi = mutual_information(&sent_u8, &got_u8).unwrap_or(0.0);

        let snr_linear = 10f64.powf(self.snr_db / 10.0);
        let eb_n0_db = self.eb_n0_db();

        let report = LinkReport {
            payload_bits: bits.len(),
            coded_bits,
            symbols: tx.len(),
            code_rate: self.code_rate(),
            snr_db: self.snr_db,
            eb_n0_db,
            noise_variance,
            measured_snr_db: measure_snr(tx, rx).ok(),
            channel_ber,
            channel_ser,
            bit_errors: errors,
            ber,
            bler,
            evm_percent: evm(tx, rx).ok(),
            theoretical_ber: theoretical_ber(eb_n0_db, self.config.scheme),
            source_entropy: entropy(&sent_u8),
            mutual_information: mi,
            capacity: channel_capacity(snr_linear),
            decoded,
        };
        debug!(ber = report.ber, bler = report.bler, errors = report.bit_errors, "scored");
        report
    }
}

/// BER and SER of the demodulated coded bits
fn pre_decoding_rates(coded: &BitSlice<u8, Msb0>, hard: &BitSlice<u8, Msb0>, bps: usize) -> (f64, f64) {
    let len = coded.len().min(hard.len());
    let (a, b) = (&coded[..len], &hard[..len]);
    (
        bit_error_rate(a, b).unwrap_or(0.0),
        symbol_error_rate(a, b, bps).unwrap_or(0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracing_init::init_test_tracing;
    use crate::util::bitvec_utils::random_bits;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_config() {
        let config = LinkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scheme, Scheme::Qpsk);
        assert_eq!(config.decoding, DecodingMode::HardDecision);
        assert_eq!(config.code, CodeConfig::Ldpc { rate: 0.5, block_length: 648 });
    }

    #[test]
    fn test_validate_rejects_inconsistent_settings() {
        let config = LinkConfig {
            crc_aided: true,
            ..LinkConfig::default()
        };
        assert!(matches!(config.validate(), Err(SimulationError::InvalidConfig { .. })));

        let config = LinkConfig {
            list_size: 0,
            ..LinkConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LinkConfig {
            snr: SnrSetting::SnrDb(f64::NAN),
            ..LinkConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_code_parameters_surface_as_code_error() {
        let config = LinkConfig {
            code: CodeConfig::Polar { n: 100, k: 50 },
            ..LinkConfig::default()
        };
        assert!(matches!(LinkSimulator::new(config), Err(SimulationError::Code { .. })));
    }

    #[test]
    fn test_eb_n0_setting_resolves_to_symbol_snr() {
        let config = LinkConfig {
            code: CodeConfig::Ldpc { rate: 0.5, block_length: 96 },
            scheme: Scheme::Qam16,
            snr: SnrSetting::EbN0Db(5.0),
            ..LinkConfig::default()
        };
        let sim = LinkSimulator::new(config).unwrap();
        // 4 bits * rate 1/2 = 2 info bits per symbol
        assert!((sim.snr_db() - (5.0 + 10.0 * 2f64.log10())).abs() < 1e-12);
        assert!((sim.eb_n0_db() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_high_snr_run_is_error_free() {
        init_test_tracing();
        let mut rng = StdRng::seed_from_u64(1);
        for code in [
            CodeConfig::Ldpc { rate: 0.5, block_length: 128 },
            CodeConfig::Polar { n: 128, k: 64 },
            CodeConfig::Uncoded,
        ] {
            for decoding in [DecodingMode::HardDecision, DecodingMode::Iterative] {
                let sim = LinkSimulator::new(LinkConfig {
                    code,
                    snr: SnrSetting::SnrDb(25.0),
                    decoding,
                    ..LinkConfig::default()
                })
                .unwrap();
                let bits = random_bits(300, &mut rng);
                let report = sim.run(&bits, &mut rng);
                assert_eq!(report.decoded, bits, "{:?} {:?}", code, decoding);
                assert_eq!(report.ber, 0.0);
                assert_eq!(report.bler, 0.0);
                assert_eq!(report.channel_ber, 0.0);
                assert_eq!(report.payload_bits, 300);
                assert!(report.measured_snr_db.is_some());
            }
        }
    }

    #[test]
    fn test_report_fields() {
        let mut rng = StdRng::seed_from_u64(9);
        let sim = LinkSimulator::new(LinkConfig {
            code: CodeConfig::Polar { n: 64, k: 32 },
            scheme: Scheme::Qam16,
            snr: SnrSetting::SnrDb(30.0),
            ..LinkConfig::default()
        })
        .unwrap();
        let bits = random_bits(50, &mut rng);
        let report = sim.run(&bits, &mut rng);
        // 50 bits -> 2 blocks of 32 -> 128 coded bits -> 32 16QAM symbols
        assert_eq!(report.coded_bits, 128);
        assert_eq!(report.symbols, 32);
        assert_eq!(report.code_rate, 0.5);
        assert_eq!(report.decoded.len(), 50);
        assert!((report.mutual_information - report.source_entropy).abs() < 1e-12);
        assert!((report.capacity - (1.0 + 1000.0f64).log2()).abs() < 1e-9);
        let evm = report.evm_percent.unwrap();
        assert!(evm > 0.0 && evm < 10.0, "evm {}", evm);
    }

    #[test]
    fn test_crc_aided_polar_link() {
        let mut rng = StdRng::seed_from_u64(5);
        let sim = LinkSimulator::new(LinkConfig {
            code: CodeConfig::Polar { n: 128, k: 80 },
            decoding: DecodingMode::Iterative,
            crc_aided: true,
            snr: SnrSetting::SnrDb(20.0),
            ..LinkConfig::default()
        })
        .unwrap();
        assert_eq!(sim.code().message_len(), 64);
        let bits = random_bits(128, &mut rng);
        let report = sim.run(&bits, &mut rng);
        assert_eq!(report.decoded, bits);
    }
}
