//! LDPC (Low-Density Parity Check) coding
//!
//! An (n, k) systematic code built from a parity-check matrix:
//!
//! **Encoding**: The message (k bits) is followed by n - k parity bits, each
//! the XOR of the data bits marked in its matrix row.
//!
//! **Decoding**: Two decoders share the [`Decoder`] interface. The
//! hard-decision baseline thresholds the data LLRs. The sum-product decoder
//! runs belief propagation over the effective Tanner graph (each check spans
//! its marked data bits plus its own parity bit) for up to
//! [`DEFAULT_MAX_ITERATIONS`] iterations.
//!
//! **Module Organization**:
//! - `matrix` - Parity-check matrix and pluggable construction
//! - `graph` - Effective Tanner graph and syndrome
//! - `encode` - Systematic encoder
//! - `decode` - Hard-decision and sum-product decoders

mod decode;
mod encode;
mod graph;
mod matrix;

use std::sync::Arc;

use bitvec::prelude::*;
use snafu::ensure;
use tracing::info;

use crate::coding::{
    hard_decisions, ChannelCode, CodingError, DegenerateCodeSnafu, Decoder, InvalidRateSnafu,
};

pub use decode::{BpOutcome, HardDecisionDecoder, SumProductDecoder};
pub use graph::TannerGraph;
pub use matrix::{CyclicStrideBuilder, MatrixBuilder, ParityCheckMatrix};

/// Default codeword length
pub const DEFAULT_BLOCK_LENGTH: usize = 648;

/// Default iteration cap for belief propagation
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Systematic LDPC coder with a fixed parity-check matrix
#[derive(Debug, Clone)]
pub struct LdpcCoder {
    code_rate: f64,
    matrix: ParityCheckMatrix,
    graph: Arc<TannerGraph>,
}

impl LdpcCoder {
    /// Build a coder with the cyclic-stride matrix
    ///
    /// `k = floor(block_length * code_rate)`. The rate must lie in (0, 1) and
    /// the resulting k must satisfy `0 < k < n`.
    pub fn new(code_rate: f64, block_length: usize) -> Result<Self, CodingError> {
        Self::with_builder(code_rate, block_length, &CyclicStrideBuilder::default())
    }

    /// Build a coder with a caller-supplied matrix construction
    pub fn with_builder(
        code_rate: f64,
        block_length: usize,
        builder: &dyn MatrixBuilder,
    ) -> Result<Self, CodingError> {
        ensure!(code_rate > 0.0 && code_rate < 1.0, InvalidRateSnafu { rate: code_rate });
        let n = block_length;
        let k = (n as f64 * code_rate).floor() as usize;
        ensure!(k > 0 && k < n, DegenerateCodeSnafu { n, k, rate: code_rate });

        let matrix = builder.build(n, k);
        let graph = Arc::new(TannerGraph::from_matrix(&matrix));
        info!(n, k, checks = matrix.num_checks(), ?builder, "built ldpc code");

        Ok(LdpcCoder {
            code_rate,
            matrix,
            graph,
        })
    }

    /// The nominal rate requested at construction
    pub fn code_rate(&self) -> f64 {
        self.code_rate
    }

    pub fn n(&self) -> usize {
        self.matrix.n()
    }

    pub fn k(&self) -> usize {
        self.matrix.k()
    }

    pub fn matrix(&self) -> &ParityCheckMatrix {
        &self.matrix
    }

    pub fn graph(&self) -> &TannerGraph {
        &self.graph
    }

    /// Hard-decision decode: threshold the LLRs and keep the first k bits
    pub fn decode(&self, llrs: &[f64]) -> BitVec<u8, Msb0> {
        let mut bits = hard_decisions(&llrs[..llrs.len().min(self.k())]);
        bits.resize(self.k(), false);
        bits
    }

    /// Violated checks of a received word, one bit per check
    pub fn syndrome(&self, codeword: &BitSlice<u8, Msb0>) -> BitVec<u8, Msb0> {
        self.graph.syndrome(codeword)
    }

    pub fn is_codeword(&self, codeword: &BitSlice<u8, Msb0>) -> bool {
        codeword.len() == self.n() && self.syndrome(codeword).not_any()
    }

    pub fn hard_decoder(&self) -> HardDecisionDecoder {
        HardDecisionDecoder::new(self.k())
    }

    pub fn sum_product_decoder(&self) -> SumProductDecoder {
        self.sum_product_decoder_with_iterations(DEFAULT_MAX_ITERATIONS)
    }

    pub fn sum_product_decoder_with_iterations(&self, max_iterations: usize) -> SumProductDecoder {
        SumProductDecoder::new(Arc::clone(&self.graph), max_iterations)
    }

    /// Decoder selected by mode: sum-product when `iterative`, hard otherwise
    pub fn decoder(&self, iterative: bool, max_iterations: usize) -> Box<dyn Decoder> {
        if iterative {
            Box::new(self.sum_product_decoder_with_iterations(max_iterations))
        } else {
            Box::new(self.hard_decoder())
        }
    }
}

impl ChannelCode for LdpcCoder {
    fn message_len(&self) -> usize {
        self.k()
    }

    fn codeword_len(&self) -> usize {
        self.n()
    }

    fn encode(&self, data: &BitSlice<u8, Msb0>) -> BitVec<u8, Msb0> {
        encode::encode(&self.graph, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::AwgnChannel;
    use crate::coding::{decode_blocks, encode_blocks};
    use crate::modulation::{demodulate_soft, modulate, Scheme};
    use crate::tracing_init::init_test_tracing;
    use crate::util::bitvec_utils::{bits_from_str, random_bits};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parameters() {
        let coder = LdpcCoder::new(0.5, DEFAULT_BLOCK_LENGTH).unwrap();
        assert_eq!(coder.n(), 648);
        assert_eq!(coder.k(), 324);
        assert_eq!(coder.matrix().num_checks(), 324);
        assert_eq!(coder.rate(), 0.5);

        let coder = LdpcCoder::new(0.75, 100).unwrap();
        assert_eq!(coder.k(), 75);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(matches!(LdpcCoder::new(0.0, 648), Err(CodingError::InvalidRate { .. })));
        assert!(matches!(LdpcCoder::new(1.0, 648), Err(CodingError::InvalidRate { .. })));
        assert!(matches!(LdpcCoder::new(1.5, 648), Err(CodingError::InvalidRate { .. })));
        assert!(matches!(
            LdpcCoder::new(0.1, 5),
            Err(CodingError::DegenerateCode { k: 0, .. })
        ));
    }

    #[test]
    fn test_systematic_and_valid() {
        let mut rng = StdRng::seed_from_u64(17);
        let coder = LdpcCoder::new(0.5, DEFAULT_BLOCK_LENGTH).unwrap();
        for _ in 0..5 {
            let data = random_bits(coder.k(), &mut rng);
            let codeword = coder.encode(&data);
            assert_eq!(codeword.len(), coder.n());
            assert_eq!(&codeword[..coder.k()], &data[..]);
            assert!(coder.is_codeword(&codeword));
        }
    }

    #[test]
    fn test_single_flip_violates_checks() {
        let coder = LdpcCoder::new(0.5, 96).unwrap();
        let mut codeword = coder.encode(&bits_from_str("1100 1010 0110 1001"));
        let flipped = !codeword[3];
        codeword.set(3, flipped);
        assert!(!coder.is_codeword(&codeword));
    }

    #[test]
    fn test_noiseless_decode() {
        let coder = LdpcCoder::new(0.5, 96).unwrap();
        let data = bits_from_str("1011 0011 1000 1111 0101 0000 1110 0110 1001 0010 1100 0111");
        let codeword = coder.encode(&data);
        let llrs: Vec<f64> = codeword.iter().by_vals().map(|b| if b { -3.0 } else { 3.0 }).collect();
        assert_eq!(coder.decode(&llrs), data);
        assert_eq!(coder.hard_decoder().decode(&llrs), data);
        assert_eq!(coder.sum_product_decoder().decode(&llrs), data);
    }

    #[test]
    fn test_belief_propagation_beats_hard_decision() {
        init_test_tracing();
        let mut rng = StdRng::seed_from_u64(2024);
        let coder = LdpcCoder::new(0.5, DEFAULT_BLOCK_LENGTH).unwrap();
        let data = random_bits(coder.k() * 8, &mut rng);
        let coded = encode_blocks(&coder, &data);

        let symbols = modulate(&coded, Scheme::Qpsk);
        let channel = AwgnChannel::from_eb_n0(3.0, 2, coder.rate());
        let out = channel.add_noise(&symbols, &mut rng);
        let llrs = demodulate_soft(&out.symbols, Scheme::Qpsk, out.noise_variance);

        let count_errors = |decoded: &BitSlice<u8, Msb0>| {
            decoded.iter().zip(data.iter()).filter(|(a, b)| **a != **b).count()
        };
        let hard_errors = count_errors(&decode_blocks(&coder.hard_decoder(), coder.n(), &llrs));
        let bp_errors = count_errors(&decode_blocks(&coder.sum_product_decoder(), coder.n(), &llrs));
        assert!(hard_errors > 0);
        assert!(bp_errors < hard_errors, "bp {} hard {}", bp_errors, hard_errors);
    }
}
