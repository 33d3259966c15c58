//! Channel-code capabilities shared by the LDPC, polar and uncoded paths
//!
//! A [`ChannelCode`] maps fixed-size k-bit messages to n-bit codewords; a
//! [`Decoder`] maps n LLRs back to k bits. Decoders never report failure:
//! a wrong result is only visible by comparing against the transmitted bits.

use std::fmt::Debug;

use bitvec::prelude::*;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CodingError {
    #[snafu(display("code rate {rate} must lie strictly between 0 and 1"))]
    InvalidRate { rate: f64 },

    #[snafu(display("block length {n} with rate {rate} gives {k} message bits; need 0 < k < n"))]
    DegenerateCode { n: usize, k: usize, rate: f64 },

    #[snafu(display("polar block length {n} is not a power of two"))]
    NotPowerOfTwo { n: usize },

    #[snafu(display("message length {k} must satisfy 0 < k <= {n}"))]
    InvalidMessageLength { n: usize, k: usize },

    #[snafu(display("reliability ranker returned {got} scores for {n} bit-channels"))]
    RankerLength { n: usize, got: usize },
}

/// A fixed-length block code
pub trait ChannelCode: Debug + Send + Sync {
    /// Message length k
    fn message_len(&self) -> usize;

    /// Codeword length n
    fn codeword_len(&self) -> usize;

    /// Encode one message; shorter input is zero-padded, longer input truncated
    fn encode(&self, data: &BitSlice<u8, Msb0>) -> BitVec<u8, Msb0>;

    fn rate(&self) -> f64 {
        self.message_len() as f64 / self.codeword_len() as f64
    }
}

/// Soft-input decoder for one codeword
pub trait Decoder: Debug + Send + Sync {
    /// Decode n LLRs (positive favours 0) into k message bits
    fn decode(&self, llrs: &[f64]) -> BitVec<u8, Msb0>;
}

/// Hard decision on one LLR
#[inline]
pub fn hard_decision(llr: f64) -> bool {
    llr < 0.0
}

/// Hard decisions on a whole LLR sequence
pub fn hard_decisions(llrs: &[f64]) -> BitVec<u8, Msb0> {
    llrs.iter().map(|&l| hard_decision(l)).collect()
}

/// Encode an arbitrary-length payload block by block
///
/// The final block is zero-padded to k bits.
pub fn encode_blocks<C: ChannelCode + ?Sized>(code: &C, data: &BitSlice<u8, Msb0>) -> BitVec<u8, Msb0> {
    let k = code.message_len();
    let mut out = BitVec::with_capacity(data.len().div_ceil(k) * code.codeword_len());
    for block in data.chunks(k) {
        out.extend_from_bitslice(&code.encode(block));
    }
    out
}

/// Decode a concatenation of n-LLR blocks
///
/// A short final block is padded with erasures (LLR 0).
pub fn decode_blocks<D: Decoder + ?Sized>(decoder: &D, n: usize, llrs: &[f64]) -> BitVec<u8, Msb0> {
    let mut out = BitVec::new();
    for block in llrs.chunks(n) {
        if block.len() == n {
            out.extend_from_bitslice(&decoder.decode(block));
        } else {
            let mut padded = block.to_vec();
            padded.resize(n, 0.0);
            out.extend_from_bitslice(&decoder.decode(&padded));
        }
    }
    out
}

/// Identity code: codewords are the message itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uncoded {
    block_len: usize,
}

impl Uncoded {
    pub fn new(block_len: usize) -> Self {
        Uncoded {
            block_len: block_len.max(1),
        }
    }

    pub fn decoder(&self) -> UncodedDecoder {
        UncodedDecoder {
            block_len: self.block_len,
        }
    }
}

impl ChannelCode for Uncoded {
    fn message_len(&self) -> usize {
        self.block_len
    }

    fn codeword_len(&self) -> usize {
        self.block_len
    }

    fn encode(&self, data: &BitSlice<u8, Msb0>) -> BitVec<u8, Msb0> {
        fit_to_len(data, self.block_len)
    }
}

/// Threshold decoder for [`Uncoded`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UncodedDecoder {
    block_len: usize,
}

impl Decoder for UncodedDecoder {
    fn decode(&self, llrs: &[f64]) -> BitVec<u8, Msb0> {
        let mut bits = hard_decisions(&llrs[..llrs.len().min(self.block_len)]);
        bits.resize(self.block_len, false);
        bits
    }
}

/// Truncate or zero-pad a bit slice to exactly `len` bits
pub(crate) fn fit_to_len(data: &BitSlice<u8, Msb0>, len: usize) -> BitVec<u8, Msb0> {
    let mut bits = data[..data.len().min(len)].to_bitvec();
    bits.resize(len, false);
    bits
}
