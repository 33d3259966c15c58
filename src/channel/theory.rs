//! Link-budget conversions and closed-form error rates
//!
//! All SNR quantities are per symbol. `SNR = Eb/N0 * bits_per_symbol * code_rate`
//! in the linear domain.

use crate::modulation::Scheme;

/// dB to linear power ratio
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

/// Linear power ratio to dB
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    10.0 * linear.log10()
}

/// Per-dimension noise variance that realizes a given Eb/N0
pub fn noise_variance_from_eb_n0(eb_n0_db: f64, bits_per_symbol: usize, code_rate: f64) -> f64 {
    let snr = db_to_linear(eb_n0_db) * bits_per_symbol as f64 * code_rate;
    1.0 / (2.0 * snr)
}

/// Symbol SNR (dB) to Eb/N0 (dB)
pub fn snr_to_eb_n0(snr_db: f64, bits_per_symbol: usize, code_rate: f64) -> f64 {
    let eb_n0 = db_to_linear(snr_db) / (bits_per_symbol as f64 * code_rate);
    linear_to_db(eb_n0)
}

/// Eb/N0 (dB) to symbol SNR (dB)
pub fn eb_n0_to_snr(eb_n0_db: f64, bits_per_symbol: usize, code_rate: f64) -> f64 {
    let snr = db_to_linear(eb_n0_db) * bits_per_symbol as f64 * code_rate;
    linear_to_db(snr)
}

/// Complementary error function
///
/// Abramowitz and Stegun 7.1.26, |error| < 1.5e-7.
pub fn erfc(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let t = 1.0 / (1.0 + P * x.abs());
    let poly = t * (A1 + t * (A2 + t * (A3 + t * (A4 + t * A5))));
    let erf_abs = 1.0 - poly * (-x * x).exp();

    if x >= 0.0 {
        1.0 - erf_abs
    } else {
        1.0 + erf_abs
    }
}

/// Theoretical BER of BPSK (and Gray QPSK) over AWGN
pub fn theoretical_ber_bpsk(eb_n0_db: f64) -> f64 {
    0.5 * erfc(db_to_linear(eb_n0_db).sqrt())
}

/// Approximate theoretical BER for a scheme over AWGN
///
/// QPSK uses the exact BPSK expression; square M-QAM uses the usual
/// nearest-neighbour approximation
/// `(2/k)(1 - 1/sqrt(M)) erfc(sqrt(3 k Eb/N0 / (2 (M - 1))))`.
pub fn theoretical_ber(eb_n0_db: f64, scheme: Scheme) -> f64 {
    match scheme {
        Scheme::Qpsk => theoretical_ber_bpsk(eb_n0_db),
        _ => {
            let m = scheme.order() as f64;
            let k = scheme.bits_per_symbol() as f64;
            let eb_n0 = db_to_linear(eb_n0_db);
            (2.0 / k) * (1.0 - 1.0 / m.sqrt()) * erfc((3.0 * k * eb_n0 / (2.0 * (m - 1.0))).sqrt())
        }
    }
}
