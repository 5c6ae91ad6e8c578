//! Hardware bit instructions, enabled through the `intrinsics` feature.
#![cfg(target_pointer_width = "64")]
#![cfg(feature = "intrinsics")]

/// Counts the bits set in `x` with the hardware popcount.
#[inline(always)]
pub const fn popcount(x: usize) -> usize {
    x.count_ones() as usize
}

/// Bit-scan-forward: the position of the lowest bit set.
#[inline(always)]
pub const fn bsf64(mask: usize) -> Option<usize> {
    if mask != 0 {
        Some(mask.trailing_zeros() as usize)
    } else {
        None
    }
}

/// Bit-scan-reverse: the position of the highest bit set.
#[inline(always)]
pub const fn bsr64(mask: usize) -> Option<usize> {
    if mask != 0 {
        Some(63 - mask.leading_zeros() as usize)
    } else {
        None
    }
}
