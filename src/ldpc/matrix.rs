//! Parity-check matrix construction
//!
//! The matrix is built once per coder by a pluggable [`MatrixBuilder`]. The
//! default [`CyclicStrideBuilder`] is a deterministic heuristic with a fixed
//! row weight; it does not guarantee a full-rank or cycle-free graph.

use std::fmt::Debug;

use bitvec::prelude::*;

/// Binary `(n - k) x n` parity-check matrix, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityCheckMatrix {
    n: usize,
    k: usize,
    rows: Vec<BitVec<u8, Msb0>>,
}

impl ParityCheckMatrix {
    /// All-zero matrix for an (n, k) code
    pub fn zeros(n: usize, k: usize) -> Self {
        let rows = vec![bitvec![u8, Msb0; 0; n]; n.saturating_sub(k)];
        ParityCheckMatrix { n, k, rows }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of parity checks (rows)
    pub fn num_checks(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, i: usize) -> &BitSlice<u8, Msb0> {
        &self.rows[i]
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.rows[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        self.rows[row].set(col, value);
    }

    /// Number of marked columns in a row
    pub fn row_weight(&self, i: usize) -> usize {
        self.rows[i].count_ones()
    }

    /// Marked data columns (`j < k`) of a row, ascending
    pub fn data_columns(&self, i: usize) -> Vec<usize> {
        self.rows[i][..self.k].iter_ones().collect()
    }
}

/// Strategy for building the parity-check matrix of an (n, k) code
pub trait MatrixBuilder: Debug + Send + Sync {
    fn build(&self, n: usize, k: usize) -> ParityCheckMatrix;
}

/// Cyclic-stride construction
///
/// Row `i` has `dc = floor(n * dv / (n - k))` marks at columns
/// `(i * dc + j) mod n` for `j < dc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclicStrideBuilder {
    pub variable_degree: usize,
}

impl CyclicStrideBuilder {
    pub fn row_degree(&self, n: usize, k: usize) -> usize {
        n * self.variable_degree / (n - k)
    }
}

impl Default for CyclicStrideBuilder {
    fn default() -> Self {
        CyclicStrideBuilder { variable_degree: 3 }
    }
}

impl MatrixBuilder for CyclicStrideBuilder {
    fn build(&self, n: usize, k: usize) -> ParityCheckMatrix {
        let mut h = ParityCheckMatrix::zeros(n, k);
        if k >= n {
            return h;
        }
        let dc = self.row_degree(n, k);
        for i in 0..n - k {
            for j in 0..dc {
                h.set(i, (i * dc + j) % n, true);
            }
        }
        h
    }
}
