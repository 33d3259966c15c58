//! Constellation tables
//!
//! Index `i` of a table is the symbol whose bit pattern is `i` written MSB
//! first over `bits_per_symbol` bits. QAM tables are laid out row by row:
//! `index = i * L + q`, with `q` selecting the in-phase (real) level and `i`
//! the quadrature (imaginary) level. This ordering defines the bit-to-point
//! mapping, so modulator and demodulator must share these tables.

use lazy_static::lazy_static;
use num::complex::Complex64;

use super::Scheme;

lazy_static! {
    static ref QPSK: Vec<Complex64> = qpsk_constellation();
    static ref QAM16: Vec<Complex64> = qam_constellation(4, 10.0);
    static ref QAM64: Vec<Complex64> = qam_constellation(8, 42.0);
    static ref QAM256: Vec<Complex64> = qam_constellation(16, 170.0);
}

/// Constellation for a modulation scheme, normalized to unit mean energy
pub fn constellation(scheme: Scheme) -> &'static [Complex64] {
    match scheme {
        Scheme::Qpsk => QPSK.as_slice(),
        Scheme::Qam16 => QAM16.as_slice(),
        Scheme::Qam64 => QAM64.as_slice(),
        Scheme::Qam256 => QAM256.as_slice(),
    }
}

fn qpsk_constellation() -> Vec<Complex64> {
    let s = std::f64::consts::FRAC_1_SQRT_2;
    vec![
        Complex64::new(s, s),   // 00
        Complex64::new(s, -s),  // 01
        Complex64::new(-s, s),  // 10
        Complex64::new(-s, -s), // 11
    ]
}

/// Square QAM with `side` amplitude levels per axis
///
/// Levels are the odd integers `-(side-1) ..= side-1`; `energy_divisor` is the
/// mean energy of the unscaled grid (2(M-1)/3).
fn qam_constellation(side: usize, energy_divisor: f64) -> Vec<Complex64> {
    let scale = 1.0 / energy_divisor.sqrt();
    let levels: Vec<f64> = (0..side)
        .map(|l| (2 * l) as f64 - (side - 1) as f64)
        .collect();

    let mut points = Vec::with_capacity(side * side);
    for i in 0..side {
        for q in 0..side {
            points.push(Complex64::new(levels[q] * scale, levels[i] * scale));
        }
    }
    points
}

/// Mean squared magnitude of a set of points
pub fn average_energy(points: &[Complex64]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.norm_sqr()).sum::<f64>() / points.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Scheme; 4] = [Scheme::Qpsk, Scheme::Qam16, Scheme::Qam64, Scheme::Qam256];

    #[test]
    fn test_constellation_sizes() {
        for scheme in ALL {
            assert_eq!(constellation(scheme).len(), 1 << scheme.bits_per_symbol());
        }
    }

    #[test]
    fn test_unit_average_energy() {
        for scheme in ALL {
            let energy = average_energy(constellation(scheme));
            assert!((energy - 1.0).abs() < 1e-12, "{:?} energy {}", scheme, energy);
        }
    }

    #[test]
    fn test_qam16_layout() {
        let points = constellation(Scheme::Qam16);
        let s = 1.0 / 10f64.sqrt();
        // index 0: q = 0 (real -3), i = 0 (imag -3)
        assert!((points[0] - Complex64::new(-3.0 * s, -3.0 * s)).norm() < 1e-12);
        // index 1: q = 1 (real -1), i = 0
        assert!((points[1] - Complex64::new(-s, -3.0 * s)).norm() < 1e-12);
        // index 4: q = 0, i = 1 (imag -1)
        assert!((points[4] - Complex64::new(-3.0 * s, -s)).norm() < 1e-12);
        // index 15: both axes at +3
        assert!((points[15] - Complex64::new(3.0 * s, 3.0 * s)).norm() < 1e-12);
    }

    #[test]
    fn test_points_are_distinct() {
        for scheme in ALL {
            let points = constellation(scheme);
            for a in 0..points.len() {
                for b in (a + 1)..points.len() {
                    assert!((points[a] - points[b]).norm() > 1e-6);
                }
            }
        }
    }
}
