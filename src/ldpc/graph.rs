//! Effective Tanner graph of the systematic code
//!
//! Check `i` connects the data bits marked in row `i` of the parity-check
//! matrix and its own parity bit `k + i`. This is exactly the set of
//! constraints the encoder satisfies, so every codeword it emits has a zero
//! syndrome over this graph.

use bitvec::prelude::*;

use super::matrix::ParityCheckMatrix;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TannerGraph {
    n: usize,
    k: usize,
    /// Variable indices per check
    checks: Vec<Vec<usize>>,
    /// `(check, edge position within that check)` per variable
    variables: Vec<Vec<(usize, usize)>>,
}

impl TannerGraph {
    pub fn from_matrix(h: &ParityCheckMatrix) -> Self {
        let (n, k) = (h.n(), h.k());
        let mut checks = Vec::with_capacity(h.num_checks());
        let mut variables = vec![Vec::new(); n];

        for i in 0..h.num_checks() {
            let mut members = h.data_columns(i);
            members.push(k + i);
            for (pos, &v) in members.iter().enumerate() {
                variables[v].push((i, pos));
            }
            checks.push(members);
        }

        TannerGraph {
            n,
            k,
            checks,
            variables,
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn num_checks(&self) -> usize {
        self.checks.len()
    }

    pub fn check(&self, i: usize) -> &[usize] {
        &self.checks[i]
    }

    pub fn variable(&self, v: usize) -> &[(usize, usize)] {
        &self.variables[v]
    }

    /// Data bits feeding parity bit `i`
    pub fn data_members(&self, i: usize) -> &[usize] {
        let members = &self.checks[i];
        &members[..members.len() - 1]
    }

    /// One bit per check, set where the check is violated
    pub fn syndrome(&self, codeword: &BitSlice<u8, Msb0>) -> BitVec<u8, Msb0> {
        self.checks
            .iter()
            .map(|members| {
                members
                    .iter()
                    .filter(|&&v| v < codeword.len() && codeword[v])
                    .count()
                    % 2
                    == 1
            })
            .collect()
    }

    /// Number of violated checks
    pub fn unsatisfied_checks(&self, codeword: &BitSlice<u8, Msb0>) -> usize {
        self.syndrome(codeword).count_ones()
    }
}
