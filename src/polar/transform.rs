use bitvec::prelude::*;

/// In-place polar butterfly over GF(2)
///
/// For each stage with `distance = 2^stage`, every `i` with `i < i ^ distance`
/// gets `x[i] ^= x[i ^ distance]`. This is the n-fold Kronecker power of
/// `[[1, 0], [1, 1]]` and is its own inverse. `x.len()` must be a power of two.
pub fn polar_transform_in_place(x: &mut BitSlice<u8, Msb0>) {
    let n = x.len();
    let mut distance = 1;
    while distance < n {
        for i in 0..n {
            let partner = i ^ distance;
            if i < partner {
                let v = x[i] ^ x[partner];
                x.set(i, v);
            }
        }
        distance <<= 1;
    }
}

/// Polar transform of a bit vector
pub fn polar_transform(u: &BitSlice<u8, Msb0>) -> BitVec<u8, Msb0> {
    let mut x = u.to_bitvec();
    polar_transform_in_place(&mut x);
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::bitvec_utils::{bits_from_str, random_bits};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_small_transforms() {
        assert_eq!(polar_transform(&bits_from_str("01")), bits_from_str("11"));
        assert_eq!(polar_transform(&bits_from_str("10")), bits_from_str("10"));
        // Last input drives every output
        assert_eq!(polar_transform(&bits_from_str("0001")), bits_from_str("1111"));
        assert_eq!(polar_transform(&bits_from_str("1000")), bits_from_str("1000"));
        assert_eq!(polar_transform(&bits_from_str("0100")), bits_from_str("1100"));
    }

    #[test]
    fn test_involution() {
        let mut rng = StdRng::seed_from_u64(99);
        for log_n in 0..10 {
            let u = random_bits(1 << log_n, &mut rng);
            assert_eq!(polar_transform(&polar_transform(&u)), u, "n = {}", 1 << log_n);
        }
    }

    #[test]
    fn test_linearity() {
        let mut rng = StdRng::seed_from_u64(5);
        let a = random_bits(32, &mut rng);
        let b = random_bits(32, &mut rng);
        let xor = |x: &BitSlice<u8, Msb0>, y: &BitSlice<u8, Msb0>| -> BitVec<u8, Msb0> {
            x.iter().by_vals().zip(y.iter().by_vals()).map(|(p, q)| p ^ q).collect()
        };
        assert_eq!(
            polar_transform(&xor(&a, &b)),
            xor(&polar_transform(&a), &polar_transform(&b))
        );
    }
}
