//! Link quality metrics
//!
//! Bit-level rates return `None` when the two sequences differ in length,
//! mirroring a null result; sample-level metrics return [`MetricsError`].

use bitvec::prelude::*;
use num::complex::Complex64;
use snafu::{ensure, Snafu};

/// Default segmental-SNR frame: 20 ms at 44.1 kHz
pub const DEFAULT_FRAME_SIZE: usize = 882;

/// Peak sample value for 8-bit data
const PEAK: f64 = 255.0;

#[derive(Debug, Snafu)]
pub enum MetricsError {
    #[snafu(display("sequence lengths differ: {left} vs {right}"))]
    LengthMismatch { left: usize, right: usize },

    #[snafu(display("metric is undefined for empty input"))]
    EmptyInput,

    #[snafu(display("frame size must be positive"))]
    ZeroFrameSize,
}

fn check_pair(left: usize, right: usize) -> Result<(), MetricsError> {
    ensure!(left == right, LengthMismatchSnafu { left, right });
    ensure!(left > 0, EmptyInputSnafu);
    Ok(())
}

/// Number of positions where the two bit sequences differ
pub fn bit_errors(transmitted: &BitSlice<u8, Msb0>, received: &BitSlice<u8, Msb0>) -> Option<usize> {
    if transmitted.len() != received.len() {
        return None;
    }
    Some(
        transmitted
            .iter()
            .by_vals()
            .zip(received.iter().by_vals())
            .filter(|(t, r)| t != r)
            .count(),
    )
}

/// Fraction of differing bits; 0 for two empty sequences
pub fn bit_error_rate(transmitted: &BitSlice<u8, Msb0>, received: &BitSlice<u8, Msb0>) -> Option<f64> {
    let errors = bit_errors(transmitted, received)?;
    if transmitted.is_empty() {
        return Some(0.0);
    }
    Some(errors as f64 / transmitted.len() as f64)
}

/// Fraction of `bits_per_symbol` groups containing at least one differing bit
pub fn symbol_error_rate(
    transmitted: &BitSlice<u8, Msb0>,
    received: &BitSlice<u8, Msb0>,
    bits_per_symbol: usize,
) -> Option<f64> {
    block_error_rate(transmitted, received, bits_per_symbol)
}

/// Fraction of `block_size` blocks containing at least one differing bit
///
/// A trailing partial block counts as a block.
pub fn block_error_rate(
    transmitted: &BitSlice<u8, Msb0>,
    received: &BitSlice<u8, Msb0>,
    block_size: usize,
) -> Option<f64> {
    if transmitted.len() != received.len() || block_size == 0 {
        return None;
    }
    if transmitted.is_empty() {
        return Some(0.0);
    }

    let blocks = transmitted.len().div_ceil(block_size);
    let errored = transmitted
        .chunks(block_size)
        .zip(received.chunks(block_size))
        .filter(|(t, r)| t != r)
        .count();
    Some(errored as f64 / blocks as f64)
}

/// Mean squared error between two sample sequences
pub fn mse(original: &[f64], received: &[f64]) -> Result<f64, MetricsError> {
    check_pair(original.len(), received.len())?;
    let sum: f64 = original
        .iter()
        .zip(received)
        .map(|(a, b)| (a - b) * (a - b))
        .sum();
    Ok(sum / original.len() as f64)
}

/// Peak signal-to-noise ratio in dB for 8-bit samples; infinite for identical input
pub fn psnr(original: &[f64], received: &[f64]) -> Result<f64, MetricsError> {
    let mse = mse(original, received)?;
    if mse == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(10.0 * (PEAK * PEAK / mse).log10())
}

/// Structural similarity over a single global window
pub fn ssim(original: &[f64], received: &[f64]) -> Result<f64, MetricsError> {
    check_pair(original.len(), received.len())?;
    let n = original.len() as f64;
    let c1 = (0.01 * PEAK).powi(2);
    let c2 = (0.03 * PEAK).powi(2);

    let mean_x = original.iter().sum::<f64>() / n;
    let mean_y = received.iter().sum::<f64>() / n;

    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov = 0.0;
    for (&x, &y) in original.iter().zip(received) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        var_x += dx * dx;
        var_y += dy * dy;
        cov += dx * dy;
    }
    var_x /= n;
    var_y /= n;
    cov /= n;

    let numerator = (2.0 * mean_x * mean_y + c1) * (2.0 * cov + c2);
    let denominator = (mean_x * mean_x + mean_y * mean_y + c1) * (var_x + var_y + c2);
    Ok(numerator / denominator)
}

/// Mean per-frame SNR in dB over the whole frames only
///
/// Trailing samples that do not fill a frame are ignored, and input shorter
/// than one frame scores 0. Frames whose signal or noise power is zero add
/// nothing to the sum but still count in the divisor.
pub fn segmental_snr(original: &[f64], received: &[f64], frame_size: usize) -> Result<f64, MetricsError> {
    check_pair(original.len(), received.len())?;
    ensure!(frame_size > 0, ZeroFrameSizeSnafu);

    let frames = original.len() / frame_size;
    if frames == 0 {
        return Ok(0.0);
    }

    let mut total = 0.0;
    for (orig, recv) in original
        .chunks_exact(frame_size)
        .zip(received.chunks_exact(frame_size))
    {
        let signal: f64 = orig.iter().map(|s| s * s).sum();
        let noise: f64 = orig.iter().zip(recv).map(|(a, b)| (a - b) * (a - b)).sum();
        if signal > 0.0 && noise > 0.0 {
            total += 10.0 * (signal / noise).log10();
        }
    }
    Ok(total / frames as f64)
}

/// Error vector magnitude in percent of the reference RMS power
pub fn evm(reference: &[Complex64], received: &[Complex64]) -> Result<f64, MetricsError> {
    check_pair(reference.len(), received.len())?;
    let n = reference.len() as f64;
    let error_power = reference
        .iter()
        .zip(received)
        .map(|(r, y)| (y - r).norm_sqr())
        .sum::<f64>()
        / n;
    let reference_power = reference.iter().map(|r| r.norm_sqr()).sum::<f64>() / n;
    Ok(100.0 * (error_power / reference_power).sqrt())
}

/// Edit distance (insertions, deletions, substitutions) via the full DP table
pub fn levenshtein_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let (m, n) = (a.len(), b.len());
    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            dp[i][j] = if a[i - 1] == b[j - 1] {
                dp[i - 1][j - 1]
            } else {
                1 + dp[i - 1][j - 1].min(dp[i - 1][j]).min(dp[i][j - 1])
            };
        }
    }
    dp[m][n]
}

/// Edit distance between two strings, by character
pub fn levenshtein_str(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_distance(&a, &b)
}
