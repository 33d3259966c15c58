use bitvec::prelude::*;
use rand::Rng;

/// Interpret a bit slice as an unsigned big-endian index (MSB first)
pub fn bitslice_to_index(bs: &BitSlice<u8, Msb0>) -> usize {
    assert!(bs.len() <= usize::BITS as usize, "BitSlice length must be <= {}", usize::BITS);
    let mut value = 0usize;
    for bit in bs {
        value = (value << 1) | (*bit as usize);
    }
    value
}

/// Append the `width` low bits of `index` to `out`, MSB first
pub fn push_index_bits(out: &mut BitVec<u8, Msb0>, index: usize, width: usize) {
    for b in (0..width).rev() {
        out.push((index >> b) & 1 == 1);
    }
}

/// Unpack bytes into bits, MSB first
pub fn bits_from_bytes(bytes: &[u8]) -> BitVec<u8, Msb0> {
    bytes.view_bits::<Msb0>().to_bitvec()
}

/// Pack bits into bytes, MSB first. A partial final byte is zero-padded.
pub fn bits_to_bytes(bits: &BitSlice<u8, Msb0>) -> Vec<u8> {
    let mut bv = bits.to_bitvec();
    bv.set_uninitialized(false);
    bv.into_vec()
}

/// Build a bit vector from a string of '0' and '1' characters.
///
/// Any other character (spaces, underscores) is skipped, which keeps long
/// literals in tests readable.
pub fn bits_from_str(s: &str) -> BitVec<u8, Msb0> {
    s.chars()
        .filter_map(|c| match c {
            '0' => Some(false),
            '1' => Some(true),
            _ => None,
        })
        .collect()
}

/// Convert 0/1 integers into bits. Any non-zero value is a 1.
pub fn bits_from_u8s(values: &[u8]) -> BitVec<u8, Msb0> {
    values.iter().map(|&v| v != 0).collect()
}

/// Convert bits into 0/1 integers
pub fn bits_to_u8s(bits: &BitSlice<u8, Msb0>) -> Vec<u8> {
    bits.iter().by_vals().map(|b| b as u8).collect()
}

/// Draw `len` independent, equiprobable bits from `rng`
pub fn random_bits<R: Rng + ?Sized>(len: usize, rng: &mut R) -> BitVec<u8, Msb0> {
    (0..len).map(|_| rng.random::<bool>()).collect()
}
