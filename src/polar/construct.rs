//! Frozen-bit selection

use std::fmt::Debug;

use bitvec::prelude::*;
use snafu::ensure;

use crate::coding::{CodingError, InvalidMessageLengthSnafu, RankerLengthSnafu};

/// Reverse the low `bits` bits of `value`
#[inline]
pub fn bit_reverse(value: usize, bits: u32) -> usize {
    if bits == 0 {
        return 0;
    }
    value.reverse_bits() >> (usize::BITS - bits)
}

/// Strategy for scoring bit-channel reliability
pub trait ReliabilityRanker: Debug + Send + Sync {
    /// One score per bit-channel index; higher is more reliable
    fn scores(&self, n: usize) -> Vec<f64>;
}

/// Bit-reversal proxy: `score(i) = bit_reverse(i, log2 n) / n`
///
/// A cheap stand-in for a density-evolution or Bhattacharyya ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitReversalRanker;

impl ReliabilityRanker for BitReversalRanker {
    fn scores(&self, n: usize) -> Vec<f64> {
        let bits = n.trailing_zeros();
        (0..n).map(|i| bit_reverse(i, bits) as f64 / n as f64).collect()
    }
}

/// Partition of the n bit-channels into information and frozen positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrozenSet {
    info_positions: Vec<usize>,
    frozen_positions: Vec<usize>,
    frozen_mask: BitVec<u8, Msb0>,
}

impl FrozenSet {
    /// Keep the `k` highest-scoring channels for information
    ///
    /// Ties keep the lower index first. Both position lists come out ascending.
    /// The ranker must return exactly `n` scores and `k` must not exceed `n`.
    pub fn from_ranker(n: usize, k: usize, ranker: &dyn ReliabilityRanker) -> Result<Self, CodingError> {
        ensure!(k <= n, InvalidMessageLengthSnafu { n, k });
        let scores = ranker.scores(n);
        ensure!(scores.len() == n, RankerLengthSnafu { n, got: scores.len() });
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let mut info_positions = order[..k].to_vec();
        info_positions.sort_unstable();

        let mut frozen_mask = bitvec![u8, Msb0; 1; n];
        for &i in &info_positions {
            frozen_mask.set(i, false);
        }
        let frozen_positions = frozen_mask.iter_ones().collect();

        Ok(FrozenSet {
            info_positions,
            frozen_positions,
            frozen_mask,
        })
    }

    pub fn n(&self) -> usize {
        self.frozen_mask.len()
    }

    pub fn k(&self) -> usize {
        self.info_positions.len()
    }

    pub fn info_positions(&self) -> &[usize] {
        &self.info_positions
    }

    pub fn frozen_positions(&self) -> &[usize] {
        &self.frozen_positions
    }

    pub fn is_frozen(&self, i: usize) -> bool {
        self.frozen_mask[i]
    }

    pub fn frozen_mask(&self) -> &BitSlice<u8, Msb0> {
        &self.frozen_mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_reverse() {
        assert_eq!(bit_reverse(1, 3), 4);
        assert_eq!(bit_reverse(6, 3), 3);
        assert_eq!(bit_reverse(0b1011, 4), 0b1101);
        assert_eq!(bit_reverse(0, 0), 0);
        for i in 0..64 {
            assert_eq!(bit_reverse(bit_reverse(i, 6), 6), i);
        }
    }

    #[test]
    fn test_n8_k4_partition() {
        let set = FrozenSet::from_ranker(8, 4, &BitReversalRanker).unwrap();
        assert_eq!(set.info_positions(), &[1, 3, 5, 7]);
        assert_eq!(set.frozen_positions(), &[0, 2, 4, 6]);
        assert!(set.is_frozen(0));
        assert!(!set.is_frozen(7));
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let set = FrozenSet::from_ranker(64, 22, &BitReversalRanker).unwrap();
        assert_eq!(set.k(), 22);
        assert_eq!(set.frozen_positions().len(), 42);
        let mut all: Vec<usize> = set
            .info_positions()
            .iter()
            .chain(set.frozen_positions())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn test_last_channel_is_most_reliable() {
        let set = FrozenSet::from_ranker(16, 1, &BitReversalRanker).unwrap();
        assert_eq!(set.info_positions(), &[15]);
        let set = FrozenSet::from_ranker(16, 16, &BitReversalRanker).unwrap();
        assert!(set.frozen_positions().is_empty());
    }

    #[derive(Debug)]
    struct ShortRanker;

    impl ReliabilityRanker for ShortRanker {
        fn scores(&self, n: usize) -> Vec<f64> {
            vec![0.0; n / 2]
        }
    }

    #[test]
    fn test_short_ranking_rejected() {
        assert!(matches!(
            FrozenSet::from_ranker(8, 4, &ShortRanker),
            Err(CodingError::RankerLength { n: 8, got: 4 })
        ));
        assert!(matches!(
            FrozenSet::from_ranker(8, 9, &BitReversalRanker),
            Err(CodingError::InvalidMessageLength { n: 8, k: 9 })
        ));
    }
}
