//! Frequency-table estimators of entropy, mutual information and capacity
//!
//! All logarithms are base 2, so results are in bits. Estimates come from
//! relative frequencies of the symbols actually observed.

use std::collections::HashMap;
use std::hash::Hash;

use snafu::{ensure, Snafu};

#[derive(Debug, Snafu)]
pub enum InfoError {
    #[snafu(display("paired sequences differ in length: {left} vs {right}"))]
    LengthMismatch { left: usize, right: usize },
}

fn counts<T: Eq + Hash + Clone>(data: &[T]) -> HashMap<T, usize> {
    let mut freq = HashMap::new();
    for symbol in data {
        *freq.entry(symbol.clone()).or_insert(0) += 1;
    }
    freq
}

fn entropy_of_counts<'a, I: IntoIterator<Item = &'a usize>>(counts: I, total: usize) -> f64 {
    counts
        .into_iter()
        .map(|&c| {
            let p = c as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

/// Relative frequency of each observed symbol
pub fn estimate_distribution<T: Eq + Hash + Clone>(data: &[T]) -> HashMap<T, f64> {
    let total = data.len() as f64;
    counts(data)
        .into_iter()
        .map(|(symbol, c)| (symbol, c as f64 / total))
        .collect()
}

/// Shannon entropy `H(X)`; 0 for an empty sample
pub fn entropy<T: Eq + Hash + Clone>(data: &[T]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    entropy_of_counts(counts(data).values(), data.len())
}

/// Joint entropy `H(X, Y)` of a paired sample
pub fn joint_entropy<X, Y>(x: &[X], y: &[Y]) -> Result<f64, InfoError>
where
    X: Eq + Hash + Clone,
    Y: Eq + Hash + Clone,
{
    ensure!(x.len() == y.len(), LengthMismatchSnafu { left: x.len(), right: y.len() });
    if x.is_empty() {
        return Ok(0.0);
    }
    let pairs: Vec<(X, Y)> = x.iter().cloned().zip(y.iter().cloned()).collect();
    Ok(entropy(&pairs))
}

/// `H(X | Y) = H(X, Y) - H(Y)`
pub fn conditional_entropy<X, Y>(x: &[X], y: &[Y]) -> Result<f64, InfoError>
where
    X: Eq + Hash + Clone,
    Y: Eq + Hash + Clone,
{
    Ok(joint_entropy(x, y)? - entropy(y))
}

/// `I(X; Y) = H(X) + H(Y) - H(X, Y)`
pub fn mutual_information<X, Y>(x: &[X], y: &[Y]) -> Result<f64, InfoError>
where
    X: Eq + Hash + Clone,
    Y: Eq + Hash + Clone,
{
    let h_xy = joint_entropy(x, y)?;
    Ok(entropy(x) + entropy(y) - h_xy)
}

/// `I(X; Y)` as the double sum `p(x,y) log2(p(x,y) / (p(x) p(y)))`
pub fn mutual_information_direct<X, Y>(x: &[X], y: &[Y]) -> Result<f64, InfoError>
where
    X: Eq + Hash + Clone,
    Y: Eq + Hash + Clone,
{
    ensure!(x.len() == y.len(), LengthMismatchSnafu { left: x.len(), right: y.len() });
    if x.is_empty() {
        return Ok(0.0);
    }

    let pairs: Vec<(X, Y)> = x.iter().cloned().zip(y.iter().cloned()).collect();
    let p_xy = estimate_distribution(&pairs);
    let p_x = estimate_distribution(x);
    let p_y = estimate_distribution(y);

    let mi = p_xy
        .iter()
        .map(|((a, b), &p)| p * (p / (p_x[a] * p_y[b])).log2())
        .sum();
    Ok(mi)
}

/// Shannon capacity `log2(1 + snr)` in bits per channel use
pub fn channel_capacity(snr: f64) -> f64 {
    (1.0 + snr).log2()
}

/// Capacity for an SNR given in dB
pub fn channel_capacity_db(snr_db: f64) -> f64 {
    channel_capacity(10f64.powf(snr_db / 10.0))
}

/// `D(P || Q) = sum p log2(p / q)`, skipping terms where either probability is not positive
pub fn kl_divergence(p: &[f64], q: &[f64]) -> Result<f64, InfoError> {
    ensure!(p.len() == q.len(), LengthMismatchSnafu { left: p.len(), right: q.len() });
    Ok(p.iter()
        .zip(q)
        .filter(|(pi, qi)| **pi > 0.0 && **qi > 0.0)
        .map(|(&pi, &qi)| pi * (pi / qi).log2())
        .sum())
}

/// `1 - H / H_max`
pub fn redundancy(entropy: f64, max_entropy: f64) -> f64 {
    1.0 - entropy / max_entropy
}

pub fn compression_ratio(original_size: f64, compressed_size: f64) -> f64 {
    original_size / compressed_size
}

/// Bits per second carried by a source of the given entropy per symbol
pub fn information_rate(entropy: f64, symbol_rate: f64) -> f64 {
    entropy * symbol_rate
}

/// `H / L` for a code with average codeword length `L`
pub fn coding_efficiency(entropy: f64, avg_code_length: f64) -> f64 {
    entropy / avg_code_length
}

/// Entropy bound on the bits needed to store a sample losslessly
pub fn theoretical_minimum_bits<T: Eq + Hash + Clone>(data: &[T]) -> f64 {
    entropy(data) * data.len() as f64
}
