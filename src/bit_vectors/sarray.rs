//! Rank/select data structure over very sparse bit vectors using the
//! Elias-Fano scheme.
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};

use anyhow::{anyhow, Result};

use crate::bit_vectors::prelude::*;
use crate::bit_vectors::BitVector;
use crate::broadword;
use crate::mii_sequences::{EliasFano, EliasFanoBuilder};
use crate::Serializable;

/// Rank/select data structure over very sparse bit vectors, which is a
/// specialized version of [`EliasFano`] for bit vectors.
///
/// # Memory complexity
///
/// $`n \lceil \lg \frac{u}{n} \rceil + 2n + o(n)`$ bits for a bit vector with
/// $`u`$ bits and $`n`$ set bits.
///
/// # Notes
///
/// This data structure does not support select0.
///
/// # Examples
///
/// ```
/// use rlwt::bit_vectors::{SArray, prelude::*};
///
/// let sa = SArray::from_bits([true, false, false, true]).enable_rank();
///
/// assert_eq!(sa.num_bits(), 4);
/// assert_eq!(sa.access(1), Some(false));
///
/// assert_eq!(sa.rank1(1), Some(1));
/// assert_eq!(sa.rank0(1), Some(0));
/// assert_eq!(sa.select1(1), Some(3));
/// ```
///
/// # References
///
///  - D. Okanohara, and K. Sadakane, "Practical Entropy-Compressed
///    Rank/Select Dictionary," In ALENEX, 2007.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SArray {
    ef: Option<EliasFano>, // None if there is no set bit.
    num_bits: usize,
    num_ones: usize,
    has_rank: bool,
}

impl SArray {
    /// Creates a new instance from input bit stream `bits`.
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let bv = BitVector::from_bits(bits);
        let num_bits = bv.len();
        let num_ones =
            (0..bv.num_words()).fold(0, |acc, i| acc + broadword::popcount(bv.words()[i]));
        let ef = if num_ones != 0 {
            // num_vals != 0, and positions are increasing within the universe
            let mut b = EliasFanoBuilder::new(num_bits, num_ones).unwrap();
            for i in bv.unary_iter(0) {
                b.push(i).unwrap();
            }
            Some(b.build())
        } else {
            None
        };
        Self {
            ef,
            num_bits,
            num_ones,
            has_rank: false,
        }
    }

    /// Builds an index to enable rank queries.
    #[must_use]
    pub fn enable_rank(mut self) -> Self {
        if let Some(ef) = self.ef {
            self.ef = Some(ef.enable_rank());
        }
        self.has_rank = true;
        self
    }

    /// Checks if [`Self::enable_rank()`] is set.
    #[inline(always)]
    pub const fn has_rank(&self) -> bool {
        self.has_rank
    }
}

impl Build for SArray {
    /// Creates a new vector from input bit stream `bits`.
    ///
    /// # Arguments
    ///
    /// - `bits`: Bit stream.
    /// - `with_rank`: Flag to enable [`Self::enable_rank()`].
    /// - `with_select1`: Dummy (select1 is always enabled).
    /// - `with_select0`: Not supported.
    ///
    /// # Errors
    ///
    /// An error is returned if `with_select0` is set.
    fn build_from_bits<I>(
        bits: I,
        with_rank: bool,
        _with_select1: bool,
        with_select0: bool,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = bool>,
        Self: Sized,
    {
        if with_select0 {
            return Err(anyhow!("select0 is not supported for SArray."));
        }
        let mut rsbv = Self::from_bits(bits);
        if with_rank {
            rsbv = rsbv.enable_rank();
        }
        Ok(rsbv)
    }
}

impl NumBits for SArray {
    /// Returns the number of bits stored.
    #[inline(always)]
    fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Returns the number of bits set.
    #[inline(always)]
    fn num_ones(&self) -> usize {
        self.num_ones
    }
}

impl Access for SArray {
    /// Returns the `pos`-th bit, or [`None`] if out of bounds.
    ///
    /// # Complexity
    ///
    /// $`O(\lg n)`$
    fn access(&self, pos: usize) -> Option<bool> {
        if self.num_bits <= pos {
            return None;
        }
        self.ef
            .as_ref()
            .map_or(Some(false), |ef| Some(ef.binsearch(pos).is_some()))
    }
}

impl Rank for SArray {
    /// Returns the number of ones in the prefix of length `pos`, or
    /// [`None`] if `self.num_bits() < pos`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \frac{u}{n})`$
    ///
    /// # Panics
    ///
    /// It panics if the index is not built by [`Self::enable_rank()`].
    fn rank1(&self, pos: usize) -> Option<usize> {
        if !self.has_rank() {
            panic!("enable_rank() must be set up.")
        }
        if self.num_bits < pos {
            return None;
        }
        self.ef.as_ref().map_or(Some(0), |ef| ef.rank(pos))
    }

    /// Returns the number of zeros in the prefix of length `pos`, or
    /// [`None`] if `self.num_bits() < pos`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \frac{u}{n})`$
    ///
    /// # Panics
    ///
    /// It panics if the index is not built by [`Self::enable_rank()`].
    fn rank0(&self, pos: usize) -> Option<usize> {
        Some(pos - self.rank1(pos)?)
    }
}

impl Select for SArray {
    /// Searches the position of the `k`-th bit set, or
    /// [`None`] if `self.num_ones() <= k`.
    ///
    /// # Complexity
    ///
    /// Constant
    fn select1(&self, k: usize) -> Option<usize> {
        self.ef.as_ref().and_then(|ef| ef.select(k))
    }

    /// Panics always because this operation is not supported.
    fn select0(&self, _k: usize) -> Option<usize> {
        panic!("This operation is not supported.");
    }
}

impl Serializable for SArray {
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = 0;
        mem += self.ef.serialize_into(&mut writer)?;
        mem += self.num_bits.serialize_into(&mut writer)?;
        mem += self.num_ones.serialize_into(&mut writer)?;
        mem += self.has_rank.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let ef = Option::<EliasFano>::deserialize_from(&mut reader)?;
        let num_bits = usize::deserialize_from(&mut reader)?;
        let num_ones = usize::deserialize_from(&mut reader)?;
        let has_rank = bool::deserialize_from(&mut reader)?;
        Ok(Self {
            ef,
            num_bits,
            num_ones,
            has_rank,
        })
    }

    fn size_in_bytes(&self) -> usize {
        self.ef.size_in_bytes()
            + self.num_bits.size_in_bytes()
            + self.num_ones.size_in_bytes()
            + self.has_rank.size_in_bytes()
    }
}
