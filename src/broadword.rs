//! Broadword (SWAR) operations underlying the rank/select structures.
#![cfg(target_pointer_width = "64")]

#[cfg(feature = "intrinsics")]
use crate::intrinsics;

/// A one in every 8-bit lane.
pub const ONES_STEP_8: usize = 0x0101_0101_0101_0101;
/// A one in every 9-bit lane.
pub const ONES_STEP_9: usize =
    (1 << 0) | (1 << 9) | (1 << 18) | (1 << 27) | (1 << 36) | (1 << 45) | (1 << 54);
/// The top bit of every 8-bit lane.
pub const MSBS_STEP_8: usize = 0x80 * ONES_STEP_8;
/// The top bit of every 9-bit lane.
pub const MSBS_STEP_9: usize = 0x100 * ONES_STEP_9;
/// The lane index, counted from the top, in every 9-bit lane.
pub const INV_COUNT_STEP_9: usize =
    (1 << 54) | (2 << 45) | (3 << 36) | (4 << 27) | (5 << 18) | (6 << 9) | 7;

/// Returns the number of bits set in `x`.
#[inline(always)]
pub fn popcount(x: usize) -> usize {
    #[cfg(feature = "intrinsics")]
    {
        intrinsics::popcount(x)
    }
    #[cfg(not(feature = "intrinsics"))]
    {
        let x = x - ((x >> 1) & 0x5555_5555_5555_5555);
        let x = (x & 0x3333_3333_3333_3333) + ((x >> 2) & 0x3333_3333_3333_3333);
        let x = (x + (x >> 4)) & 0x0F0F_0F0F_0F0F_0F0F;
        x.wrapping_mul(ONES_STEP_8) >> 56
    }
}

/// Returns the position of the most significant bit set in `x`,
/// or [`None`] if `x == 0`.
#[inline(always)]
pub fn msb(x: usize) -> Option<usize> {
    #[cfg(feature = "intrinsics")]
    {
        intrinsics::bsr64(x)
    }
    #[cfg(not(feature = "intrinsics"))]
    {
        if x != 0 {
            Some(63 - x.leading_zeros() as usize)
        } else {
            None
        }
    }
}

/// Returns the position of the least significant bit set in `x`,
/// or [`None`] if `x == 0`.
#[inline(always)]
pub fn lsb(x: usize) -> Option<usize> {
    #[cfg(feature = "intrinsics")]
    {
        intrinsics::bsf64(x)
    }
    #[cfg(not(feature = "intrinsics"))]
    {
        if x != 0 {
            Some(x.trailing_zeros() as usize)
        } else {
            None
        }
    }
}

/// Packs the per-byte popcounts of `x` into the bytes of the result.
#[inline(always)]
pub const fn byte_counts(x: usize) -> usize {
    let x = x - ((x >> 1) & 0x5555_5555_5555_5555);
    let x = (x & 0x3333_3333_3333_3333) + ((x >> 2) & 0x3333_3333_3333_3333);
    (x + (x >> 4)) & 0x0F0F_0F0F_0F0F_0F0F
}

/// Parallel comparison of 9-bit fields: the result has a one at the low bit
/// of each field where the field of `x` is no greater than that of `y`.
#[inline(always)]
pub const fn uleq_step_9(x: usize, y: usize) -> usize {
    (((((y | MSBS_STEP_9) - (x & !MSBS_STEP_9)) | (x ^ y)) ^ (x & !y)) & MSBS_STEP_9) >> 8
}

/// Searches the position of the `k`-th bit set in the word `x`, or
/// [`None`] if `popcount(x) <= k`.
///
/// The byte containing the target is located with a parallel comparison on
/// the byte-wise prefix popcounts; the residual search runs inside one byte.
///
/// # Examples
///
/// ```
/// use rlwt::broadword::select_in_word;
///
/// assert_eq!(select_in_word(0b1010, 0), Some(1));
/// assert_eq!(select_in_word(0b1010, 1), Some(3));
/// assert_eq!(select_in_word(0b1010, 2), None);
/// ```
#[inline(always)]
pub fn select_in_word(x: usize, k: usize) -> Option<usize> {
    if popcount(x) <= k {
        return None;
    }
    let byte_sums = byte_counts(x).wrapping_mul(ONES_STEP_8);
    let k_step_8 = k * ONES_STEP_8;
    let geq_k_step_8 = ((k_step_8 | MSBS_STEP_8) - byte_sums) & MSBS_STEP_8;
    let place = popcount(geq_k_step_8) * 8;
    let byte_rank = k - ((byte_sums << 8) >> place & 0xFF);
    let mut byte = x >> place & 0xFF;
    for _ in 0..byte_rank {
        byte &= byte - 1;
    }
    Some(place + byte.trailing_zeros() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    #[test]
    fn test_popcount() {
        assert_eq!(popcount(0), 0);
        assert_eq!(popcount(usize::MAX), 64);
        assert_eq!(popcount(0b1011_0100), 4);
    }

    #[test]
    fn test_msb_lsb() {
        assert_eq!(msb(0), None);
        assert_eq!(lsb(0), None);
        assert_eq!(msb(1), Some(0));
        assert_eq!(lsb(1 << 63), Some(63));
        assert_eq!(msb(0b100100), Some(5));
        assert_eq!(lsb(0b100100), Some(2));
    }

    #[test]
    fn test_select_in_word_exhaustive_small() {
        for x in 0usize..1024 {
            let mut k = 0;
            for i in 0..10 {
                if x >> i & 1 == 1 {
                    assert_eq!(select_in_word(x, k), Some(i));
                    k += 1;
                }
            }
            assert_eq!(select_in_word(x, k), None);
        }
    }

    #[test]
    fn test_select_in_word_random() {
        let mut rng = ChaChaRng::seed_from_u64(13);
        for _ in 0..1000 {
            let x = rng.gen::<usize>();
            let mut k = 0;
            for i in 0..64 {
                if x >> i & 1 == 1 {
                    assert_eq!(select_in_word(x, k), Some(i));
                    k += 1;
                }
            }
            assert_eq!(select_in_word(x, k), None);
        }
    }

    #[test]
    fn test_uleq_step_9() {
        let x = (3 << 9) | 7;
        let y = (3 << 9) | 5;
        let m = uleq_step_9(x, y);
        assert_eq!(m & 1, 0); // 7 <= 5 fails
        assert_eq!(m >> 9 & 1, 1); // 3 <= 3 holds
    }
}
