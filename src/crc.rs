//! CRC-16 Implementation
//!
//! This module implements the 16-bit CRC attached to blocks before channel
//! coding (CRC-aided polar decoding uses it to pick among list candidates).
//! The default polynomial is 0x1021 (CCITT).
//!
//! The register is bit-serial: each input bit is shifted into the low end of
//! a register initialized to 0xFFFF, and the polynomial is folded in whenever
//! a 1 falls out of bit 15. Because no zero augmentation is applied, the
//! result equals the byte-oriented "AUG-CCITT" CRC only when 16 zero bits are
//! appended to the message (see [`crc16_bytes`]).

use bitvec::prelude::*;
use crc::{Algorithm, Crc};

/// CCITT CRC-16 polynomial
pub const CRC16_POLYNOMIAL: u16 = 0x1021;

/// Number of CRC bits appended by [`append_crc`]
pub const CRC_LEN: usize = 16;

/// Initial register value
const CRC16_INIT: u32 = 0xFFFF;

/// Byte-oriented equivalent of the bit-serial register over a message
/// followed by 16 zero bits. 0x1D0F is 0xFFFF pushed through 16 zero bits.
const CRC_AUG_CCITT: Algorithm<u16> = Algorithm {
    width: 16,
    poly: CRC16_POLYNOMIAL,
    init: 0x1D0F,
    refin: false,
    refout: false,
    xorout: 0x0000,
    check: 0xE5CC,
    residue: 0x0000,
};

const AUG_CCITT_CRC: Crc<u16> = Crc::<u16>::new(&CRC_AUG_CCITT);

/// Calculate the 16-bit CRC of a bit sequence with the default polynomial
///
/// # Example
/// ```
/// use rustylink::crc::crc16;
/// use rustylink::util::bitvec_utils::bits_from_str;
///
/// let crc = crc16(&bits_from_str("1011"));
/// assert_ne!(crc, 0);
/// ```
pub fn crc16(bits: &BitSlice<u8, Msb0>) -> u16 {
    crc16_with_polynomial(bits, CRC16_POLYNOMIAL)
}

/// Calculate the 16-bit CRC of a bit sequence with a custom polynomial
pub fn crc16_with_polynomial(bits: &BitSlice<u8, Msb0>, polynomial: u16) -> u16 {
    let mut reg = CRC16_INIT;
    for bit in bits.iter().by_vals() {
        reg = ((reg << 1) | bit as u32) & 0x1_FFFF;
        if reg & 0x1_0000 != 0 {
            reg = (reg & 0xFFFF) ^ polynomial as u32;
        }
    }
    (reg & 0xFFFF) as u16
}

/// Return `bits` followed by its CRC-16, MSB first
pub fn append_crc(bits: &BitSlice<u8, Msb0>) -> BitVec<u8, Msb0> {
    let crc = crc16(bits);
    let mut out = BitVec::with_capacity(bits.len() + CRC_LEN);
    out.extend_from_bitslice(bits);
    for i in (0..CRC_LEN).rev() {
        out.push((crc >> i) & 1 == 1);
    }
    out
}

/// Check if a bit sequence ends with the CRC-16 of everything before it
///
/// Sequences shorter than 16 bits cannot carry a CRC and never verify.
pub fn verify_crc(bits: &BitSlice<u8, Msb0>) -> bool {
    if bits.len() < CRC_LEN {
        return false;
    }
    let (data, received) = bits.split_at(bits.len() - CRC_LEN);

    let mut received_crc: u16 = 0;
    for bit in received.iter().by_vals() {
        received_crc = (received_crc << 1) | bit as u16;
    }

    crc16(data) == received_crc
}

/// CRC-16 of a byte payload, computed with a table-driven byte CRC
///
/// Equal to `crc16` over the payload's bits (MSB first) followed by 16 zero
/// bits.
pub fn crc16_bytes(bytes: &[u8]) -> u16 {
    AUG_CCITT_CRC.checksum(bytes)
}
