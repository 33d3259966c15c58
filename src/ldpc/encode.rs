//! Systematic LDPC encoding

use bitvec::prelude::*;

use super::graph::TannerGraph;
use crate::coding::fit_to_len;

/// Encode a message into a systematic codeword
///
/// The message is truncated or zero-padded to k bits. Parity bit `i` is the
/// GF(2) sum of the data bits marked in row `i` of the parity-check matrix.
/// The codeword is the k data bits followed by the n - k parity bits.
pub fn encode(graph: &TannerGraph, data: &BitSlice<u8, Msb0>) -> BitVec<u8, Msb0> {
    let k = graph.k();
    let mut codeword = fit_to_len(data, k);
    codeword.reserve(graph.n() - k);

    for i in 0..graph.num_checks() {
        let parity = graph
            .data_members(i)
            .iter()
            .fold(false, |acc, &j| acc ^ codeword[j]);
        codeword.push(parity);
    }

    codeword
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldpc::matrix::{CyclicStrideBuilder, MatrixBuilder};
    use crate::util::bitvec_utils::bits_from_str;

    fn small_graph() -> TannerGraph {
        TannerGraph::from_matrix(&CyclicStrideBuilder::default().build(12, 6))
    }

    #[test]
    fn test_encode_small_code() {
        let graph = small_graph();
        // Checks 0, 2 and 4 cover all six data bits; checks 1, 3 and 5 none
        let codeword = encode(&graph, &bits_from_str("101100"));
        assert_eq!(codeword, bits_from_str("101100 101010"));
        let codeword = encode(&graph, &bits_from_str("111000"));
        assert_eq!(codeword, bits_from_str("111000 101010"));
        let codeword = encode(&graph, &bits_from_str("110000"));
        assert_eq!(codeword, bits_from_str("110000 000000"));
    }

    #[test]
    fn test_encode_pads_and_truncates() {
        let graph = small_graph();
        assert_eq!(encode(&graph, &bits_from_str("1")), encode(&graph, &bits_from_str("100000")));
        assert_eq!(
            encode(&graph, &bits_from_str("10000011")),
            encode(&graph, &bits_from_str("100000"))
        );
    }

    #[test]
    fn test_encoder_output_satisfies_checks() {
        let graph = small_graph();
        for pattern in 0u8..64 {
            let data: BitVec<u8, Msb0> = (0..6).map(|b| (pattern >> (5 - b)) & 1 == 1).collect();
            let codeword = encode(&graph, &data);
            assert_eq!(graph.unsatisfied_checks(&codeword), 0, "pattern {:06b}", pattern);
        }
    }
}
