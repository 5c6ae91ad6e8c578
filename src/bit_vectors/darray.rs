//! Constant-time select data structure over dense integer sets with the
//! dense-array technique by Okanohara and Sadakane.
#![cfg(target_pointer_width = "64")]

pub mod inner;

use std::io::{Read, Write};

use anyhow::Result;

use crate::bit_vectors::prelude::*;
use crate::bit_vectors::BitVector;
use crate::Serializable;
use inner::DArrayIndex;

/// Constant-time select data structure over dense integer sets.
///
/// In the default configuration, this supports only [`Self::select1()`];
/// [`Self::enable_select0()`] adds the zero-side directory. It serves as the
/// select structure for the high bits of
/// [`EliasFano`](crate::mii_sequences::EliasFano).
///
/// # Examples
///
/// ```
/// use rlwt::bit_vectors::{DArray, prelude::*};
///
/// let da = DArray::from_bits([true, false, false, true]).enable_select0();
///
/// assert_eq!(da.num_bits(), 4);
/// assert_eq!(da.num_ones(), 2);
/// assert_eq!(da.select1(1), Some(3));
/// assert_eq!(da.select0(0), Some(1));
/// ```
///
/// # References
///
///  - D. Okanohara, and K. Sadakane, "Practical Entropy-Compressed Rank/Select
///    Dictionary," In ALENEX, 2007.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct DArray {
    bv: BitVector,
    s1: DArrayIndex,
    s0: Option<DArrayIndex>,
}

impl DArray {
    /// Creates a new instance from input bit stream `bits`.
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let bv = BitVector::from_bits(bits);
        let s1 = DArrayIndex::new(&bv, true);
        Self { bv, s1, s0: None }
    }

    /// Builds an index to enable select0.
    #[must_use]
    pub fn enable_select0(mut self) -> Self {
        self.s0 = Some(DArrayIndex::new(&self.bv, false));
        self
    }

    /// Checks if [`Self::enable_select0()`] is set.
    #[inline(always)]
    pub const fn has_select0(&self) -> bool {
        self.s0.is_some()
    }

    /// Returns the reference of the internal bit vector.
    pub const fn bit_vector(&self) -> &BitVector {
        &self.bv
    }
}

impl NumBits for DArray {
    /// Returns the number of bits stored.
    #[inline(always)]
    fn num_bits(&self) -> usize {
        self.bv.len()
    }

    /// Returns the number of bits set.
    #[inline(always)]
    fn num_ones(&self) -> usize {
        self.s1.num_ones()
    }
}

impl Access for DArray {
    /// Returns the `pos`-th bit, or [`None`] if out of bounds.
    fn access(&self, pos: usize) -> Option<bool> {
        self.bv.access(pos)
    }
}

impl Select for DArray {
    /// Searches the position of the `k`-th bit set, or
    /// [`None`] if `self.num_ones() <= k`.
    ///
    /// # Complexity
    ///
    /// Constant
    fn select1(&self, k: usize) -> Option<usize> {
        unsafe { self.s1.select(&self.bv, k) }
    }

    /// Searches the position of the `k`-th bit unset, or
    /// [`None`] if `self.num_zeros() <= k`.
    ///
    /// # Panics
    ///
    /// It panics if the index is not built by [`Self::enable_select0()`].
    ///
    /// # Complexity
    ///
    /// Constant
    fn select0(&self, k: usize) -> Option<usize> {
        let s0 = self
            .s0
            .as_ref()
            .unwrap_or_else(|| panic!("enable_select0() must be set up."));
        unsafe { s0.select(&self.bv, k) }
    }
}

impl Serializable for DArray {
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = 0;
        mem += self.bv.serialize_into(&mut writer)?;
        mem += self.s1.serialize_into(&mut writer)?;
        mem += self.s0.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let bv = BitVector::deserialize_from(&mut reader)?;
        let s1 = DArrayIndex::deserialize_from(&mut reader)?;
        let s0 = Option::<DArrayIndex>::deserialize_from(&mut reader)?;
        Ok(Self { bv, s1, s0 })
    }

    fn size_in_bytes(&self) -> usize {
        self.bv.size_in_bytes() + self.s1.size_in_bytes() + self.s0.size_in_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic]
    fn test_select0_panic() {
        let da = DArray::from_bits([false, true, false]);
        da.select0(0);
    }

    #[test]
    fn test_all_zeros() {
        let da = DArray::from_bits([false, false, false]).enable_select0();
        assert_eq!(da.select1(0), None);
        assert_eq!(da.select0(2), Some(2));
        assert_eq!(da.select0(3), None);
    }

    #[test]
    fn test_serialize() {
        let mut bytes = vec![];
        let da = DArray::from_bits([true, false, false, true]).enable_select0();
        let size = da.serialize_into(&mut bytes).unwrap();
        let other = DArray::deserialize_from(&bytes[..]).unwrap();
        assert_eq!(da, other);
        assert_eq!(size, bytes.len());
        assert_eq!(size, da.size_in_bytes());
    }
}
