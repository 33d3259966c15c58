//! LDPC decoders
//!
//! [`HardDecisionDecoder`] thresholds the channel LLRs and keeps the data
//! part. [`SumProductDecoder`] runs flooding belief propagation over the
//! effective Tanner graph and stops as soon as every check is satisfied.

use std::sync::Arc;

use bitvec::prelude::*;
use tracing::trace;

use super::graph::TannerGraph;
use crate::coding::{hard_decision, Decoder};

/// Largest |tanh| product fed to atanh; keeps check messages finite
const MAX_TANH_PRODUCT: f64 = 1.0 - 1e-12;

/// Threshold the first k LLRs; no use is made of the parity bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardDecisionDecoder {
    k: usize,
}

impl HardDecisionDecoder {
    pub fn new(k: usize) -> Self {
        HardDecisionDecoder { k }
    }
}

impl Decoder for HardDecisionDecoder {
    fn decode(&self, llrs: &[f64]) -> BitVec<u8, Msb0> {
        let mut bits: BitVec<u8, Msb0> = llrs.iter().take(self.k).map(|&l| hard_decision(l)).collect();
        bits.resize(self.k, false);
        bits
    }
}

/// Result of one belief-propagation run
#[derive(Debug, Clone, PartialEq)]
pub struct BpOutcome {
    /// Decoded message bits (k)
    pub message: BitVec<u8, Msb0>,
    /// Iterations performed; 0 means the channel decisions already satisfied every check
    pub iterations: usize,
    /// Checks violated by the channel hard decisions
    pub initial_unsatisfied: usize,
    /// Checks still violated by the returned decisions
    pub final_unsatisfied: usize,
    /// Posterior LLRs of all n bits
    pub posteriors: Vec<f64>,
}

impl BpOutcome {
    pub fn converged(&self) -> bool {
        self.final_unsatisfied == 0
    }
}

/// Sum-product (tanh rule) belief propagation
#[derive(Debug, Clone)]
pub struct SumProductDecoder {
    graph: Arc<TannerGraph>,
    max_iterations: usize,
}

impl SumProductDecoder {
    pub fn new(graph: Arc<TannerGraph>, max_iterations: usize) -> Self {
        SumProductDecoder {
            graph,
            max_iterations,
        }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Run belief propagation and report convergence details
    ///
    /// LLRs beyond n are ignored; missing ones are treated as erasures.
    pub fn run(&self, llrs: &[f64]) -> BpOutcome {
        let graph = &*self.graph;
        let n = graph.n();
        let k = graph.k();

        let mut channel = llrs[..llrs.len().min(n)].to_vec();
        channel.resize(n, 0.0);

        // Messages live on edges, indexed [check][position within check]
        let mut toc: Vec<Vec<f64>> = (0..graph.num_checks())
            .map(|c| graph.check(c).iter().map(|&v| channel[v]).collect())
            .collect();
        let mut tov: Vec<Vec<f64>> = toc.iter().map(|edges| vec![0.0; edges.len()]).collect();
        let mut zn = channel.clone();
        let mut initial_unsatisfied = 0;
        let mut iter = 0;

        loop {
            for (v, z) in zn.iter_mut().enumerate() {
                *z = channel[v]
                    + graph
                        .variable(v)
                        .iter()
                        .map(|&(c, pos)| tov[c][pos])
                        .sum::<f64>();
            }

            let cw: BitVec<u8, Msb0> = zn.iter().map(|&l| hard_decision(l)).collect();
            let unsatisfied = graph.unsatisfied_checks(&cw);
            if iter == 0 {
                initial_unsatisfied = unsatisfied;
            }
            trace!(iter, unsatisfied, "bp iteration");

            if unsatisfied == 0 || iter == self.max_iterations {
                return BpOutcome {
                    message: cw[..k].to_bitvec(),
                    iterations: iter,
                    initial_unsatisfied,
                    final_unsatisfied: unsatisfied,
                    posteriors: zn,
                };
            }

            // Variable to check: everything except what this check sent last time
            for (c, edges) in toc.iter_mut().enumerate() {
                for (pos, msg) in edges.iter_mut().enumerate() {
                    let v = graph.check(c)[pos];
                    *msg = zn[v] - tov[c][pos];
                }
            }

            // Check to variable
            for (c, edges) in tov.iter_mut().enumerate() {
                let halves: Vec<f64> = toc[c].iter().map(|&m| (m / 2.0).tanh()).collect();
                for (pos, msg) in edges.iter_mut().enumerate() {
                    let product: f64 = halves
                        .iter()
                        .enumerate()
                        .filter(|&(other, _)| other != pos)
                        .map(|(_, &t)| t)
                        .product();
                    let product = product.clamp(-MAX_TANH_PRODUCT, MAX_TANH_PRODUCT);
                    *msg = 2.0 * product.atanh();
                }
            }

            iter += 1;
        }
    }
}

impl Decoder for SumProductDecoder {
    fn decode(&self, llrs: &[f64]) -> BitVec<u8, Msb0> {
        self.run(llrs).message
    }
}
