//! Digital modulation
//!
//! Maps coded bits onto unit-energy QPSK/QAM constellations and back. The
//! modulator groups bits into `bits_per_symbol` chunks (zero-padding the last
//! one) and emits the table point at the chunk's big-endian index; the
//! demodulator produces either hard bits (nearest point) or max-log LLRs.
//!
//! **Module Organization**:
//! - `constellation` - Fixed, lazily built constellation tables
//! - `demod` - Hard and soft (LLR) demodulation

use std::fmt;
use std::str::FromStr;

use bitvec::prelude::*;
use num::complex::Complex64;
use snafu::Snafu;
use tracing::warn;

use crate::util::bitvec_utils::bitslice_to_index;

pub mod constellation;
pub mod demod;

pub use constellation::{average_energy, constellation};
pub use demod::{bit_llr, demodulate_hard, demodulate_soft, squared_distance, Demodulator};

#[derive(Debug, Snafu)]
pub enum ModulationError {
    /// Scheme name not recognized
    #[snafu(display("unknown modulation scheme \"{name}\""))]
    UnknownScheme { name: String },
}

/// Supported modulation schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scheme {
    #[default]
    Qpsk,
    Qam16,
    Qam64,
    Qam256,
}

impl Scheme {
    /// Lenient lookup: unknown names fall back to QPSK
    pub fn from_name(name: &str) -> Scheme {
        name.parse().unwrap_or_else(|_| {
            warn!(name, "unknown modulation scheme, falling back to qpsk");
            Scheme::Qpsk
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scheme::Qpsk => "qpsk",
            Scheme::Qam16 => "16qam",
            Scheme::Qam64 => "64qam",
            Scheme::Qam256 => "256qam",
        }
    }

    pub fn bits_per_symbol(&self) -> usize {
        match self {
            Scheme::Qpsk => 2,
            Scheme::Qam16 => 4,
            Scheme::Qam64 => 6,
            Scheme::Qam256 => 8,
        }
    }

    /// Number of constellation points
    pub fn order(&self) -> usize {
        1 << self.bits_per_symbol()
    }
}

impl FromStr for Scheme {
    type Err = ModulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "qpsk" => Ok(Scheme::Qpsk),
            "16qam" => Ok(Scheme::Qam16),
            "64qam" => Ok(Scheme::Qam64),
            "256qam" => Ok(Scheme::Qam256),
            _ => UnknownSchemeSnafu { name: s }.fail(),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bits per symbol for a scheme name; unknown names count as QPSK (2)
pub fn bits_per_symbol(name: &str) -> usize {
    name.parse::<Scheme>().map(|s| s.bits_per_symbol()).unwrap_or(2)
}

/// Bit-to-symbol mapper for one scheme
#[derive(Debug, Clone, Copy)]
pub struct Modulator {
    scheme: Scheme,
    points: &'static [Complex64],
}

impl Modulator {
    pub fn new(scheme: Scheme) -> Self {
        Modulator {
            scheme,
            points: constellation(scheme),
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn bits_per_symbol(&self) -> usize {
        self.scheme.bits_per_symbol()
    }

    pub fn constellation(&self) -> &'static [Complex64] {
        self.points
    }

    /// Mean symbol energy of the constellation (1.0 for every scheme)
    pub fn average_energy(&self) -> f64 {
        average_energy(self.points)
    }

    /// Map bits to symbols
    ///
    /// Produces `ceil(bits.len() / bits_per_symbol)` symbols; a trailing
    /// partial chunk is padded with zero bits.
    pub fn modulate(&self, bits: &BitSlice<u8, Msb0>) -> Vec<Complex64> {
        let bps = self.bits_per_symbol();
        bits.chunks(bps)
            .map(|chunk| {
                // Zero padding on the right is a left shift of the partial index
                let index = bitslice_to_index(chunk) << (bps - chunk.len());
                self.points[index]
            })
            .collect()
    }
}

/// Map bits to symbols with the given scheme
pub fn modulate(bits: &BitSlice<u8, Msb0>, scheme: Scheme) -> Vec<Complex64> {
    Modulator::new(scheme).modulate(bits)
}
