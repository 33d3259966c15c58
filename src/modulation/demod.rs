//! Hard and soft demodulation
//!
//! Distances are squared Euclidean throughout. Only their order matters for
//! hard decisions, and the max-log LLR scaling assumes squared distances.

use bitvec::prelude::*;
use num::complex::Complex64;

use super::{constellation, Scheme};
use crate::util::bitvec_utils::push_index_bits;

/// Squared Euclidean distance between two complex points
#[inline]
pub fn squared_distance(a: Complex64, b: Complex64) -> f64 {
    let dr = a.re - b.re;
    let di = a.im - b.im;
    dr * dr + di * di
}

/// Index of the nearest point; the first minimum wins ties
fn nearest_index(y: Complex64, points: &[Complex64]) -> usize {
    let mut min_dist = f64::INFINITY;
    let mut nearest = 0;
    for (i, &p) in points.iter().enumerate() {
        let dist = squared_distance(y, p);
        if dist < min_dist {
            min_dist = dist;
            nearest = i;
        }
    }
    nearest
}

/// Max-log LLR of one bit position of a received symbol
///
/// `bit_index` counts from the MSB of the symbol's bit pattern. Positive
/// values favour 0. An index past the last bit of the symbol carries no
/// information and yields an erasure (0).
pub fn bit_llr(y: Complex64, points: &[Complex64], bit_index: usize, noise_variance: f64) -> f64 {
    let bps = points.len().trailing_zeros() as usize;
    let Some(shift) = bps.checked_sub(bit_index + 1) else {
        return 0.0;
    };

    let mut min_dist0 = f64::INFINITY;
    let mut min_dist1 = f64::INFINITY;
    for (i, &p) in points.iter().enumerate() {
        let dist = squared_distance(y, p);
        if (i >> shift) & 1 == 0 {
            if dist < min_dist0 {
                min_dist0 = dist;
            }
        } else if dist < min_dist1 {
            min_dist1 = dist;
        }
    }

    (min_dist1 - min_dist0) / (2.0 * noise_variance)
}

/// Symbol-to-bit demapper for one scheme
#[derive(Debug, Clone, Copy)]
pub struct Demodulator {
    scheme: Scheme,
    points: &'static [Complex64],
}

impl Demodulator {
    pub fn new(scheme: Scheme) -> Self {
        Demodulator {
            scheme,
            points: constellation(scheme),
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Nearest-point decisions, `bits_per_symbol` bits per symbol
    pub fn demodulate_hard(&self, symbols: &[Complex64]) -> BitVec<u8, Msb0> {
        let bps = self.scheme.bits_per_symbol();
        let mut bits = BitVec::with_capacity(symbols.len() * bps);
        for &y in symbols {
            push_index_bits(&mut bits, nearest_index(y, self.points), bps);
        }
        bits
    }

    /// Max-log LLRs, `bits_per_symbol` values per symbol
    pub fn demodulate_soft(&self, symbols: &[Complex64], noise_variance: f64) -> Vec<f64> {
        let bps = self.scheme.bits_per_symbol();
        let mut llrs = Vec::with_capacity(symbols.len() * bps);
        for &y in symbols {
            for b in 0..bps {
                llrs.push(bit_llr(y, self.points, b, noise_variance));
            }
        }
        llrs
    }
}

/// Hard-decision demodulation with the given scheme
pub fn demodulate_hard(symbols: &[Complex64], scheme: Scheme) -> BitVec<u8, Msb0> {
    Demodulator::new(scheme).demodulate_hard(symbols)
}

/// Soft (LLR) demodulation with the given scheme and per-dimension noise variance
pub fn demodulate_soft(symbols: &[Complex64], scheme: Scheme, noise_variance: f64) -> Vec<f64> {
    Demodulator::new(scheme).demodulate_soft(symbols, noise_variance)
}
