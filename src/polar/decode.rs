//! Polar decoders
//!
//! [`HardDecisionDecoder`] inverts the transform on thresholded LLRs.
//! [`SclDecoder`] is a successive-cancellation list decoder: it walks the
//! decoding tree recursively with min-sum `f` and `g` updates, forks every
//! surviving path at each information bit, charges `|LLR|` to a path whose
//! decision disagrees with the LLR sign, and keeps the `list_size` cheapest
//! paths. A list size of 1 is plain successive cancellation.

use std::sync::Arc;

use bitvec::prelude::*;
use tracing::trace;

use super::construct::FrozenSet;
use super::transform::polar_transform_in_place;
use crate::coding::{hard_decision, Decoder};
use crate::crc::verify_crc;

/// Default number of SCL paths
pub const DEFAULT_LIST_SIZE: usize = 8;

/// Check-node update, min-sum approximation
#[inline]
fn f(a: f64, b: f64) -> f64 {
    a.signum() * b.signum() * a.abs().min(b.abs())
}

/// Variable-node update given the partial-sum bit of the upper branch
#[inline]
fn g(a: f64, b: f64, upper: bool) -> f64 {
    if upper {
        b - a
    } else {
        b + a
    }
}

/// Pad or truncate channel LLRs to n, missing values as erasures
fn fit_llrs(llrs: &[f64], n: usize) -> Vec<f64> {
    let mut out = llrs[..llrs.len().min(n)].to_vec();
    out.resize(n, 0.0);
    out
}

fn extract_info(u: &BitSlice<u8, Msb0>, frozen: &FrozenSet) -> BitVec<u8, Msb0> {
    frozen.info_positions().iter().map(|&i| u[i]).collect()
}

/// Threshold, invert the transform, read the information positions
#[derive(Debug, Clone)]
pub struct HardDecisionDecoder {
    frozen: Arc<FrozenSet>,
    message_len: usize,
}

impl HardDecisionDecoder {
    /// `message_len` bits of the information positions are returned
    pub fn new(frozen: Arc<FrozenSet>, message_len: usize) -> Self {
        HardDecisionDecoder { frozen, message_len }
    }
}

impl Decoder for HardDecisionDecoder {
    fn decode(&self, llrs: &[f64]) -> BitVec<u8, Msb0> {
        let mut u: BitVec<u8, Msb0> = fit_llrs(llrs, self.frozen.n())
            .into_iter()
            .map(hard_decision)
            .collect();
        polar_transform_in_place(&mut u);
        let mut info = extract_info(&u, &self.frozen);
        info.truncate(self.message_len);
        info
    }
}

#[derive(Debug, Clone)]
struct Path {
    /// Decided u bits so far, frozen ones included
    u: BitVec<u8, Msb0>,
    metric: f64,
}

/// One surviving SCL path
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// All k information bits, CRC included when present
    pub info: BitVec<u8, Msb0>,
    /// Accumulated path metric; lower is more likely
    pub metric: f64,
}

/// Successive-cancellation list decoder
#[derive(Debug, Clone)]
pub struct SclDecoder {
    frozen: Arc<FrozenSet>,
    list_size: usize,
    crc_aided: bool,
    message_len: usize,
}

impl SclDecoder {
    /// A list size of 0 is treated as 1
    ///
    /// With `crc_aided`, the information bits end in a 16-bit CRC; the best
    /// path that passes it wins and the CRC is stripped from the output.
    pub fn new(frozen: Arc<FrozenSet>, list_size: usize, crc_aided: bool, message_len: usize) -> Self {
        SclDecoder {
            frozen,
            list_size: list_size.max(1),
            crc_aided,
            message_len,
        }
    }

    pub fn list_size(&self) -> usize {
        self.list_size
    }

    pub fn crc_aided(&self) -> bool {
        self.crc_aided
    }

    /// Surviving paths, best metric first
    pub fn decode_list(&self, llrs: &[f64]) -> Vec<Candidate> {
        let n = self.frozen.n();
        let mut paths = vec![Path {
            u: BitVec::with_capacity(n),
            metric: 0.0,
        }];
        self.decode_node(vec![fit_llrs(llrs, n)], 0, &mut paths);

        let mut candidates: Vec<Candidate> = paths
            .into_iter()
            .map(|p| Candidate {
                info: extract_info(&p.u, &self.frozen),
                metric: p.metric,
            })
            .collect();
        candidates.sort_by(|a, b| a.metric.total_cmp(&b.metric));
        candidates
    }

    /// Decode the subtree of `size = llrs[p].len()` leaves starting at `offset`
    ///
    /// `llrs` holds one LLR vector per path in `paths`. Returns the re-encoded
    /// bits of this subtree per surviving path, and for each surviving path
    /// the index of the path it descends from at entry.
    fn decode_node(
        &self,
        llrs: Vec<Vec<f64>>,
        offset: usize,
        paths: &mut Vec<Path>,
    ) -> (Vec<BitVec<u8, Msb0>>, Vec<usize>) {
        let size = llrs[0].len();
        if size == 1 {
            return self.decide_leaf(&llrs, offset, paths);
        }

        let half = size / 2;
        let upper: Vec<Vec<f64>> = llrs
            .iter()
            .map(|l| (0..half).map(|i| f(l[i], l[i + half])).collect())
            .collect();
        let (x_upper, origin_upper) = self.decode_node(upper, offset, paths);

        let lower: Vec<Vec<f64>> = origin_upper
            .iter()
            .zip(&x_upper)
            .map(|(&o, xu)| {
                let l = &llrs[o];
                (0..half).map(|i| g(l[i], l[i + half], xu[i])).collect()
            })
            .collect();
        let (x_lower, origin_lower) = self.decode_node(lower, offset + half, paths);

        let x = origin_lower
            .iter()
            .zip(&x_lower)
            .map(|(&o, xl)| {
                let xu = &x_upper[o];
                let mut x: BitVec<u8, Msb0> = xu
                    .iter()
                    .by_vals()
                    .zip(xl.iter().by_vals())
                    .map(|(a, b)| a ^ b)
                    .collect();
                x.extend_from_bitslice(xl);
                x
            })
            .collect();
        let origin = origin_lower.iter().map(|&o| origin_upper[o]).collect();
        (x, origin)
    }

    fn decide_leaf(
        &self,
        llrs: &[Vec<f64>],
        offset: usize,
        paths: &mut Vec<Path>,
    ) -> (Vec<BitVec<u8, Msb0>>, Vec<usize>) {
        if self.frozen.is_frozen(offset) {
            for (path, l) in paths.iter_mut().zip(llrs) {
                if hard_decision(l[0]) {
                    path.metric += l[0].abs();
                }
                path.u.push(false);
            }
            let x = vec![BitVec::repeat(false, 1); paths.len()];
            return (x, (0..paths.len()).collect());
        }

        // (metric, parent, bit) for both extensions of every path
        let mut forks: Vec<(f64, usize, bool)> = Vec::with_capacity(paths.len() * 2);
        for (p, (path, l)) in paths.iter().zip(llrs).enumerate() {
            let preferred = hard_decision(l[0]);
            for bit in [false, true] {
                let penalty = if bit == preferred { 0.0 } else { l[0].abs() };
                forks.push((path.metric + penalty, p, bit));
            }
        }
        forks.sort_by(|a, b| a.0.total_cmp(&b.0));
        forks.truncate(self.list_size);

        let next: Vec<Path> = forks
            .iter()
            .map(|&(metric, p, bit)| {
                let mut u = paths[p].u.clone();
                u.push(bit);
                Path { u, metric }
            })
            .collect();
        *paths = next;

        let x = forks.iter().map(|&(_, _, bit)| BitVec::repeat(bit, 1)).collect();
        let origin = forks.iter().map(|&(_, p, _)| p).collect();
        (x, origin)
    }
}

impl Decoder for SclDecoder {
    fn decode(&self, llrs: &[f64]) -> BitVec<u8, Msb0> {
        let candidates = self.decode_list(llrs);
        let chosen = if self.crc_aided {
            let passing = candidates.iter().position(|c| verify_crc(&c.info));
            trace!(?passing, paths = candidates.len(), "crc-aided selection");
            passing.unwrap_or(0)
        } else {
            0
        };

        let mut info = candidates
            .into_iter()
            .nth(chosen)
            .map(|c| c.info)
            .unwrap_or_default();
        info.truncate(self.message_len);
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polar::construct::BitReversalRanker;
    use crate::util::bitvec_utils::bits_from_str;

    fn frozen(n: usize, k: usize) -> Arc<FrozenSet> {
        Arc::new(FrozenSet::from_ranker(n, k, &BitReversalRanker).unwrap())
    }

    #[test]
    fn test_min_sum_updates() {
        assert_eq!(f(2.0, -3.0), -2.0);
        assert_eq!(f(-4.0, -1.5), 1.5);
        assert_eq!(g(2.0, 1.0, false), 3.0);
        assert_eq!(g(2.0, 1.0, true), -1.0);
    }

    #[test]
    fn test_single_leaf_paths() {
        // n = 1, one information bit: the list holds both hypotheses
        let decoder = SclDecoder::new(frozen(1, 1), 4, false, 1);
        let list = decoder.decode_list(&[-2.5]);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].info, bits_from_str("1"));
        assert_eq!(list[0].metric, 0.0);
        assert_eq!(list[1].metric, 2.5);
    }

    #[test]
    fn test_list_never_exceeds_list_size() {
        let decoder = SclDecoder::new(frozen(32, 16), 4, false, 16);
        let llrs: Vec<f64> = (0..32).map(|i| ((i * 7 % 11) as f64 - 5.0) / 2.0).collect();
        let list = decoder.decode_list(&llrs);
        assert_eq!(list.len(), 4);
        for pair in list.windows(2) {
            assert!(pair[0].metric <= pair[1].metric);
        }
    }

    #[test]
    fn test_list_size_zero_is_sc() {
        let decoder = SclDecoder::new(frozen(8, 4), 0, false, 4);
        assert_eq!(decoder.list_size(), 1);
    }
}
