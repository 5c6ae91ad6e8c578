//! Rank/select data structure over dense bit vectors with Vigna's rank9 and
//! hinted selection techniques.
#![cfg(target_pointer_width = "64")]

pub mod inner;

use std::io::{Read, Write};

use anyhow::Result;

use crate::bit_vectors::prelude::*;
use crate::bit_vectors::BitVector;
use crate::Serializable;
use inner::Rank9SelIndex;

/// Rank/select data structure over dense bit vectors with Vigna's rank9 and
/// hinted selection techniques.
///
/// This builds rank/select indices on [`BitVector`] taking
///
/// - 25% overhead of space for the rank index, and
/// - 3% overhead of space for the select index (together with the rank's overhead).
///
/// The bit vector is embedded in the structure, so clones, moves, and
/// deserialized copies never hold a dangling index.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rlwt::bit_vectors::{Rank9Sel, prelude::*};
///
/// let bv = Rank9Sel::build_from_bits([true, false, false, true], true, true, true)?;
///
/// assert_eq!(bv.num_bits(), 4);
/// assert_eq!(bv.num_ones(), 2);
///
/// assert_eq!(bv.access(1), Some(false));
///
/// assert_eq!(bv.rank1(1), Some(1));
/// assert_eq!(bv.rank0(1), Some(0));
///
/// assert_eq!(bv.select1(1), Some(3));
/// assert_eq!(bv.select0(0), Some(1));
/// # Ok(())
/// # }
/// ```
///
/// # References
///
///  - S. Vigna, "Broadword implementation of rank/select queries," In WEA, 2008.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Rank9Sel {
    bv: BitVector,
    rs: Rank9SelIndex,
}

impl Rank9Sel {
    /// Creates a new vector from input bit vector `bv`.
    pub fn new(bv: BitVector) -> Self {
        let rs = Rank9SelIndex::new(&bv);
        Self { bv, rs }
    }

    /// Builds an index for faster select1.
    #[must_use]
    pub fn select1_hints(mut self) -> Self {
        self.rs = self.rs.select1_hints();
        self
    }

    /// Builds an index for faster select0.
    #[must_use]
    pub fn select0_hints(mut self) -> Self {
        self.rs = self.rs.select0_hints();
        self
    }

    /// Creates a new vector from input bit stream `bits`.
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        Self::new(BitVector::from_bits(bits))
    }

    /// Returns the reference of the internal bit vector.
    pub const fn bit_vector(&self) -> &BitVector {
        &self.bv
    }

    /// Returns the reference of the internal rank/select index.
    pub const fn rs_index(&self) -> &Rank9SelIndex {
        &self.rs
    }
}

impl Build for Rank9Sel {
    /// Creates a new vector from input bit stream `bits`.
    ///
    /// # Arguments
    ///
    /// - `bits`: Bit stream.
    /// - `with_rank`: Dummy (rank is always enabled).
    /// - `with_select1`: Flag to enable [`Self::select1_hints()`].
    /// - `with_select0`: Flag to enable [`Self::select0_hints()`].
    ///
    /// # Errors
    ///
    /// Never.
    fn build_from_bits<I>(
        bits: I,
        _with_rank: bool,
        with_select1: bool,
        with_select0: bool,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = bool>,
        Self: Sized,
    {
        let mut rsbv = Self::from_bits(bits);
        if with_select1 {
            rsbv = rsbv.select1_hints();
        }
        if with_select0 {
            rsbv = rsbv.select0_hints();
        }
        Ok(rsbv)
    }
}

impl NumBits for Rank9Sel {
    /// Returns the number of bits stored.
    #[inline(always)]
    fn num_bits(&self) -> usize {
        self.bv.num_bits()
    }

    /// Returns the number of bits set.
    #[inline(always)]
    fn num_ones(&self) -> usize {
        self.rs.num_ones()
    }
}

impl Access for Rank9Sel {
    /// Returns the `pos`-th bit, or [`None`] if out of bounds.
    fn access(&self, pos: usize) -> Option<bool> {
        self.bv.access(pos)
    }
}

impl Rank for Rank9Sel {
    /// Returns the number of ones in the prefix of length `pos`, or
    /// [`None`] if `self.num_bits() < pos`.
    ///
    /// # Complexity
    ///
    /// Constant
    fn rank1(&self, pos: usize) -> Option<usize> {
        unsafe { self.rs.rank1(&self.bv, pos) }
    }

    /// Returns the number of zeros in the prefix of length `pos`, or
    /// [`None`] if `self.num_bits() < pos`.
    ///
    /// # Complexity
    ///
    /// Constant
    fn rank0(&self, pos: usize) -> Option<usize> {
        unsafe { self.rs.rank0(&self.bv, pos) }
    }
}

impl Select for Rank9Sel {
    /// Searches the position of the `k`-th bit set, or
    /// [`None`] if `self.num_ones() <= k`.
    ///
    /// # Complexity
    ///
    /// Logarithmic
    fn select1(&self, k: usize) -> Option<usize> {
        unsafe { self.rs.select1(&self.bv, k) }
    }

    /// Searches the position of the `k`-th bit unset, or
    /// [`None`] if `self.num_zeros() <= k`.
    ///
    /// # Complexity
    ///
    /// Logarithmic
    fn select0(&self, k: usize) -> Option<usize> {
        unsafe { self.rs.select0(&self.bv, k) }
    }
}

impl Serializable for Rank9Sel {
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = 0;
        mem += self.bv.serialize_into(&mut writer)?;
        mem += self.rs.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let bv = BitVector::deserialize_from(&mut reader)?;
        let rs = Rank9SelIndex::deserialize_from(&mut reader)?;
        Ok(Self { bv, rs })
    }

    fn size_in_bytes(&self) -> usize {
        self.bv.size_in_bytes() + self.rs.size_in_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    #[test]
    fn test_rank1_all_zeros() {
        let bv = Rank9Sel::from_bits([false, false, false]);
        assert_eq!(bv.rank1(0), Some(0));
        assert_eq!(bv.rank1(3), Some(0));
        assert_eq!(bv.rank1(4), None);
    }

    #[test]
    fn test_select1_all_zeros() {
        let bv = Rank9Sel::from_bits([false, false, false]).select1_hints();
        assert_eq!(bv.select1(0), None);
    }

    #[test]
    fn test_select0_all_ones() {
        let bv = Rank9Sel::from_bits([true, true, true]).select0_hints();
        assert_eq!(bv.select0(0), None);
    }

    #[test]
    fn test_empty() {
        let bv = Rank9Sel::from_bits([]);
        assert_eq!(bv.num_bits(), 0);
        assert_eq!(bv.num_ones(), 0);
        assert_eq!(bv.rank1(0), Some(0));
        assert_eq!(bv.select1(0), None);
    }

    fn gen_random_bits(len: usize, seed: u64) -> Vec<bool> {
        let mut rng = ChaChaRng::seed_from_u64(seed);
        (0..len).map(|_| rng.gen::<bool>()).collect()
    }

    #[test]
    fn test_against_linear_scan() {
        for seed in 0..5 {
            let bits = gen_random_bits(2000, seed);
            let bv = Rank9Sel::from_bits(bits.iter().cloned())
                .select1_hints()
                .select0_hints();
            let mut ones = 0;
            let mut zeros = 0;
            for (i, &b) in bits.iter().enumerate() {
                assert_eq!(bv.rank1(i), Some(ones));
                assert_eq!(bv.rank0(i), Some(zeros));
                if b {
                    assert_eq!(bv.select1(ones), Some(i));
                    ones += 1;
                } else {
                    assert_eq!(bv.select0(zeros), Some(i));
                    zeros += 1;
                }
            }
            assert_eq!(bv.rank1(bits.len()), Some(ones));
            assert_eq!(bv.select1(ones), None);
            assert_eq!(bv.select0(zeros), None);
        }
    }

    #[test]
    fn test_serialize() {
        let mut bytes = vec![];
        let bv = Rank9Sel::from_bits([false, true, true, false, true])
            .select1_hints()
            .select0_hints();
        let size = bv.serialize_into(&mut bytes).unwrap();
        let other = Rank9Sel::deserialize_from(&bytes[..]).unwrap();
        assert_eq!(bv, other);
        assert_eq!(size, bytes.len());
        assert_eq!(size, bv.size_in_bytes());
    }
}
