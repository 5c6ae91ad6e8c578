//! Tagged union of the plain and sparse rank/select flavors.
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};

use anyhow::{anyhow, Result};

use crate::bit_vectors::prelude::*;
use crate::bit_vectors::{Rank9Sel, SArray};
use crate::Serializable;

/// Flavor tag of [`RsVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RsVectorKind {
    /// Plain bits indexed with [`Rank9Sel`].
    Plain = 0,
    /// Elias-Fano compressed bits indexed with [`SArray`].
    Sparse = 1,
}

impl RsVectorKind {
    /// Decodes a kind from its serialized tag.
    pub fn from_u8(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Plain),
            1 => Ok(Self::Sparse),
            _ => Err(anyhow!("invalid RsVectorKind tag: {tag}.")),
        }
    }
}

/// Rank/select bit vector whose flavor is chosen at construction time.
///
/// The plain flavor answers rank in constant time and suits dense sets; the
/// sparse flavor compresses sets with few ones and answers select1 in
/// constant time. Either way the backing bits are embedded in the chosen
/// structure, so the value can be moved, cloned, swapped, and deserialized
/// without any index rebinding.
///
/// # Examples
///
/// ```
/// use rlwt::bit_vectors::{RsVector, RsVectorKind, prelude::*};
///
/// let bv = RsVector::build_from_bits([true, false, false, true], RsVectorKind::Sparse);
///
/// assert_eq!(bv.kind(), RsVectorKind::Sparse);
/// assert_eq!(bv.num_bits(), 4);
/// assert_eq!(bv.rank1(4), Some(2));
/// assert_eq!(bv.select1(1), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RsVector {
    /// Plain flavor.
    Plain(Rank9Sel),
    /// Sparse flavor.
    Sparse(SArray),
}

impl RsVector {
    /// Creates a new vector of the given flavor from input bit stream `bits`,
    /// with rank1 and select1 enabled.
    pub fn build_from_bits<I>(bits: I, kind: RsVectorKind) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        match kind {
            RsVectorKind::Plain => Self::Plain(Rank9Sel::from_bits(bits).select1_hints()),
            RsVectorKind::Sparse => Self::Sparse(SArray::from_bits(bits).enable_rank()),
        }
    }

    /// Returns the flavor tag.
    pub const fn kind(&self) -> RsVectorKind {
        match self {
            Self::Plain(_) => RsVectorKind::Plain,
            Self::Sparse(_) => RsVectorKind::Sparse,
        }
    }
}

impl NumBits for RsVector {
    /// Returns the number of bits stored.
    fn num_bits(&self) -> usize {
        match self {
            Self::Plain(x) => x.num_bits(),
            Self::Sparse(x) => x.num_bits(),
        }
    }

    /// Returns the number of bits set.
    fn num_ones(&self) -> usize {
        match self {
            Self::Plain(x) => x.num_ones(),
            Self::Sparse(x) => x.num_ones(),
        }
    }
}

impl Access for RsVector {
    /// Returns the `pos`-th bit, or [`None`] if out of bounds.
    fn access(&self, pos: usize) -> Option<bool> {
        match self {
            Self::Plain(x) => x.access(pos),
            Self::Sparse(x) => x.access(pos),
        }
    }
}

impl Rank for RsVector {
    /// Returns the number of ones in the prefix of length `pos`, or
    /// [`None`] if `self.num_bits() < pos`.
    fn rank1(&self, pos: usize) -> Option<usize> {
        match self {
            Self::Plain(x) => x.rank1(pos),
            Self::Sparse(x) => x.rank1(pos),
        }
    }

    /// Returns the number of zeros in the prefix of length `pos`, or
    /// [`None`] if `self.num_bits() < pos`.
    fn rank0(&self, pos: usize) -> Option<usize> {
        match self {
            Self::Plain(x) => x.rank0(pos),
            Self::Sparse(x) => x.rank0(pos),
        }
    }
}

impl Select for RsVector {
    /// Searches the position of the `k`-th bit set, or
    /// [`None`] if `self.num_ones() <= k`.
    fn select1(&self, k: usize) -> Option<usize> {
        match self {
            Self::Plain(x) => x.select1(k),
            Self::Sparse(x) => x.select1(k),
        }
    }

    /// Searches the position of the `k`-th bit unset, or
    /// [`None`] if `self.num_zeros() <= k`.
    ///
    /// # Panics
    ///
    /// It panics for the sparse flavor, which does not support select0.
    fn select0(&self, k: usize) -> Option<usize> {
        match self {
            Self::Plain(x) => x.select0(k),
            Self::Sparse(x) => x.select0(k),
        }
    }
}

impl Serializable for RsVector {
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = (self.kind() as u8).serialize_into(&mut writer)?;
        mem += match self {
            Self::Plain(x) => x.serialize_into(&mut writer)?,
            Self::Sparse(x) => x.serialize_into(&mut writer)?,
        };
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let kind = RsVectorKind::from_u8(u8::deserialize_from(&mut reader)?)?;
        let x = match kind {
            RsVectorKind::Plain => Self::Plain(Rank9Sel::deserialize_from(&mut reader)?),
            RsVectorKind::Sparse => Self::Sparse(SArray::deserialize_from(&mut reader)?),
        };
        Ok(x)
    }

    fn size_in_bytes(&self) -> usize {
        u8::size_of().unwrap()
            + match self {
                Self::Plain(x) => x.size_in_bytes(),
                Self::Sparse(x) => x.size_in_bytes(),
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    #[test]
    fn test_flavors_agree() {
        let mut rng = ChaChaRng::seed_from_u64(31);
        let bits: Vec<bool> = (0..2000).map(|_| rng.gen_bool(0.05)).collect();
        let plain = RsVector::build_from_bits(bits.iter().cloned(), RsVectorKind::Plain);
        let sparse = RsVector::build_from_bits(bits.iter().cloned(), RsVectorKind::Sparse);
        assert_eq!(plain.num_ones(), sparse.num_ones());
        for i in 0..=bits.len() {
            assert_eq!(plain.rank1(i), sparse.rank1(i));
        }
        for k in 0..plain.num_ones() {
            assert_eq!(plain.select1(k), sparse.select1(k));
        }
    }

    #[test]
    fn test_invalid_tag() {
        let e = RsVectorKind::from_u8(7);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("invalid RsVectorKind tag: 7.".to_string())
        );
    }

    #[test]
    fn test_serialize_both() {
        for kind in [RsVectorKind::Plain, RsVectorKind::Sparse] {
            let bv = RsVector::build_from_bits([true, false, true, true, false], kind);
            let mut bytes = vec![];
            let size = bv.serialize_into(&mut bytes).unwrap();
            let other = RsVector::deserialize_from(&bytes[..]).unwrap();
            assert_eq!(bv, other);
            assert_eq!(size, bytes.len());
            assert_eq!(size, bv.size_in_bytes());
        }
    }
}
