//! Polar coding
//!
//! An (n, k) polar code places message bits on the k most reliable
//! bit-channels, freezes the rest to zero and applies the butterfly
//! transform. Reliability comes from a pluggable [`ReliabilityRanker`];
//! the default bit-reversal ranking is a heuristic, not a channel-polarization
//! computation.
//!
//! A coder built with [`PolarCoder::with_crc`] reserves the last 16
//! information bits for a CRC-16 of the message, which the CRC-aided list
//! decoder uses to pick among its surviving paths.
//!
//! **Module Organization**:
//! - `construct` - Reliability ranking and frozen-bit selection
//! - `transform` - GF(2) butterfly transform
//! - `decode` - Hard-decision and successive-cancellation list decoders

mod construct;
mod decode;
mod transform;

use std::sync::Arc;

use bitvec::prelude::*;
use snafu::ensure;
use tracing::info;

use crate::coding::{
    fit_to_len, ChannelCode, CodingError, Decoder, InvalidMessageLengthSnafu, NotPowerOfTwoSnafu,
};
use crate::crc::{append_crc, CRC_LEN};

pub use construct::{bit_reverse, BitReversalRanker, FrozenSet, ReliabilityRanker};
pub use decode::{Candidate, HardDecisionDecoder, SclDecoder, DEFAULT_LIST_SIZE};
pub use transform::{polar_transform, polar_transform_in_place};

/// Polar coder with a fixed frozen-bit partition
#[derive(Debug, Clone)]
pub struct PolarCoder {
    frozen: Arc<FrozenSet>,
    with_crc: bool,
}

impl PolarCoder {
    /// `n` must be a power of two and `0 < k <= n`
    pub fn new(n: usize, k: usize) -> Result<Self, CodingError> {
        Self::build(n, k, &BitReversalRanker, false)
    }

    /// Coder with a caller-supplied reliability ranking
    pub fn with_ranker(n: usize, k: usize, ranker: &dyn ReliabilityRanker) -> Result<Self, CodingError> {
        Self::build(n, k, ranker, false)
    }

    /// Coder whose k information bits carry `k - 16` message bits plus their CRC-16
    pub fn with_crc(n: usize, k: usize) -> Result<Self, CodingError> {
        ensure!(k > CRC_LEN, InvalidMessageLengthSnafu { n, k });
        Self::build(n, k, &BitReversalRanker, true)
    }

    fn build(n: usize, k: usize, ranker: &dyn ReliabilityRanker, with_crc: bool) -> Result<Self, CodingError> {
        ensure!(n.is_power_of_two(), NotPowerOfTwoSnafu { n });
        ensure!(k > 0 && k <= n, InvalidMessageLengthSnafu { n, k });

        let frozen = Arc::new(FrozenSet::from_ranker(n, k, ranker)?);
        info!(n, k, with_crc, ?ranker, "built polar code");
        Ok(PolarCoder { frozen, with_crc })
    }

    pub fn n(&self) -> usize {
        self.frozen.n()
    }

    /// Information positions, CRC included
    pub fn k(&self) -> usize {
        self.frozen.k()
    }

    pub fn has_crc(&self) -> bool {
        self.with_crc
    }

    pub fn frozen_set(&self) -> &FrozenSet {
        &self.frozen
    }

    pub fn info_positions(&self) -> &[usize] {
        self.frozen.info_positions()
    }

    pub fn frozen_positions(&self) -> &[usize] {
        self.frozen.frozen_positions()
    }

    /// Hard-decision decode: threshold, invert the transform, read the
    /// information positions
    pub fn decode(&self, llrs: &[f64]) -> BitVec<u8, Msb0> {
        self.hard_decoder().decode(llrs)
    }

    pub fn hard_decoder(&self) -> HardDecisionDecoder {
        HardDecisionDecoder::new(Arc::clone(&self.frozen), self.message_len())
    }

    /// List decoder; CRC-aided selection is on exactly when the code carries a CRC
    pub fn scl_decoder(&self, list_size: usize) -> SclDecoder {
        SclDecoder::new(Arc::clone(&self.frozen), list_size, self.with_crc, self.message_len())
    }

    /// Plain successive cancellation
    pub fn sc_decoder(&self) -> SclDecoder {
        self.scl_decoder(1)
    }

    /// Decoder selected by mode: list decoding when `iterative`, hard otherwise
    pub fn decoder(&self, iterative: bool, list_size: usize) -> Box<dyn Decoder> {
        if iterative {
            Box::new(self.scl_decoder(list_size))
        } else {
            Box::new(self.hard_decoder())
        }
    }
}

impl ChannelCode for PolarCoder {
    fn message_len(&self) -> usize {
        if self.with_crc {
            self.k() - CRC_LEN
        } else {
            self.k()
        }
    }

    fn codeword_len(&self) -> usize {
        self.n()
    }

    fn encode(&self, data: &BitSlice<u8, Msb0>) -> BitVec<u8, Msb0> {
        let message = fit_to_len(data, self.message_len());
        let info = if self.with_crc {
            append_crc(&message)
        } else {
            message
        };

        let mut u = BitVec::repeat(false, self.n());
        for (&pos, bit) in self.frozen.info_positions().iter().zip(info.iter().by_vals()) {
            u.set(pos, bit);
        }
        polar_transform_in_place(&mut u);
        u
    }
}
