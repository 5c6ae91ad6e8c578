//! Updatable compact vector in which each integer is represented in a fixed
//! number of bits.
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};

use anyhow::{anyhow, Result};

use crate::bit_vectors::BitVector;
use crate::int_vectors::prelude::*;
use crate::utils::MatrixView;
use crate::{utils, Serializable};

/// Updatable compact vector in which each integer is represented in a fixed
/// number of bits.
///
/// # Memory usage
///
/// $`n \lceil \lg u \rceil`$ bits for $`n`$ integers in which a value is in
/// $`[0,u)`$.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rlwt::int_vectors::CompactVector;
///
/// // Can store integers within 3 bits each.
/// let mut cv = CompactVector::new(3)?;
///
/// cv.push_int(7)?;
/// cv.push_int(2)?;
///
/// assert_eq!(cv.len(), 2);
/// assert_eq!(cv.get_int(0), Some(7));
///
/// cv.set_int(0, 5)?;
/// assert_eq!(cv.get_int(0), Some(5));
/// # Ok(())
/// # }
/// ```
#[derive(Default, Clone, PartialEq, Eq)]
pub struct CompactVector {
    chunks: BitVector,
    len: usize,
    width: usize,
}

impl CompactVector {
    /// Creates a new empty vector storing integers within `width` bits each.
    ///
    /// # Errors
    ///
    /// An error is returned if `width` is not in `1..=64`.
    pub fn new(width: usize) -> Result<Self> {
        if !(1..=64).contains(&width) {
            return Err(anyhow!("width must be in 1..=64, but got {width}."));
        }
        Ok(Self {
            chunks: BitVector::default(),
            len: 0,
            width,
        })
    }

    /// Creates a new empty vector storing integers within `width` bits each,
    /// where space for at least `capa` integers is reserved.
    ///
    /// # Errors
    ///
    /// An error is returned if `width` is not in `1..=64`.
    pub fn with_capacity(capa: usize, width: usize) -> Result<Self> {
        if !(1..=64).contains(&width) {
            return Err(anyhow!("width must be in 1..=64, but got {width}."));
        }
        Ok(Self {
            chunks: BitVector::with_capacity(capa * width),
            len: 0,
            width,
        })
    }

    /// Creates a new vector from a slice of integers `vals`, automatically
    /// fitting the width to the maximum value.
    ///
    /// # Examples
    ///
    /// ```
    /// use rlwt::int_vectors::CompactVector;
    ///
    /// let cv = CompactVector::from_slice(&[7u8, 2]);
    /// assert_eq!(cv.len(), 2);
    /// assert_eq!(cv.width(), 3);
    /// assert_eq!(cv.get_int(0), Some(7));
    /// ```
    pub fn from_slice<T>(vals: &[T]) -> Self
    where
        T: Into<usize> + Copy,
    {
        if vals.is_empty() {
            return Self::default();
        }
        let mut max_int = 0;
        for x in vals {
            max_int = max_int.max((*x).into());
        }
        // the computed width is always in 1..=64
        let mut cv = Self::with_capacity(vals.len(), utils::needed_bits(max_int)).unwrap();
        for x in vals {
            cv.push_int((*x).into()).unwrap();
        }
        cv
    }

    /// Returns the `pos`-th integer, or [`None`] if out of bounds.
    ///
    /// # Complexity
    ///
    /// Constant
    pub fn get_int(&self, pos: usize) -> Option<usize> {
        self.chunks.get_bits(pos * self.width, self.width)
    }

    /// Sets the `pos`-th integer to `val`.
    ///
    /// # Errors
    ///
    /// An error is returned if `pos` is out of bounds or `val` cannot be
    /// represented in `self.width()` bits.
    #[inline(always)]
    pub fn set_int(&mut self, pos: usize, val: usize) -> Result<()> {
        if self.len() <= pos {
            return Err(anyhow!(
                "pos must be no greater than self.len()={}, but got {pos}.",
                self.len()
            ));
        }
        if self.width() < 64 && val >> self.width() != 0 {
            return Err(anyhow!(
                "val must fit in self.width()={} bits, but got {val}.",
                self.width()
            ));
        }
        // in bounds by the checks above
        self.chunks
            .set_bits(pos * self.width, val, self.width)
            .unwrap();
        Ok(())
    }

    /// Pushes integer `val` at the end.
    ///
    /// # Errors
    ///
    /// An error is returned if `val` cannot be represented in
    /// `self.width()` bits.
    ///
    /// # Complexity
    ///
    /// Constant (amortized)
    #[inline(always)]
    pub fn push_int(&mut self, val: usize) -> Result<()> {
        if self.width() < 64 && val >> self.width() != 0 {
            return Err(anyhow!(
                "val must fit in self.width()={} bits, but got {val}.",
                self.width()
            ));
        }
        // width is within a word
        self.chunks.push_bits(val, self.width).unwrap();
        self.len += 1;
        Ok(())
    }

    /// Appends the integers in `vals` at the end.
    ///
    /// # Errors
    ///
    /// An error is returned if values in `vals` cannot be represented in
    /// `self.width()` bits.
    pub fn extend<I>(&mut self, vals: I) -> Result<()>
    where
        I: IntoIterator<Item = usize>,
    {
        for x in vals {
            self.push_int(x)?;
        }
        Ok(())
    }

    /// Creates an iterator for enumerating integers.
    ///
    /// # Examples
    ///
    /// ```
    /// use rlwt::int_vectors::CompactVector;
    ///
    /// let cv = CompactVector::from_slice(&[5u16, 256, 0]);
    /// let mut it = cv.iter();
    ///
    /// assert_eq!(it.next(), Some(5));
    /// assert_eq!(it.next(), Some(256));
    /// assert_eq!(it.next(), Some(0));
    /// assert_eq!(it.next(), None);
    /// ```
    pub const fn iter(&self) -> Iter {
        Iter::new(self)
    }

    /// Gets the number of integers.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the vector is empty.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the number of bits used to represent an integer.
    #[inline(always)]
    pub const fn width(&self) -> usize {
        self.width
    }
}

impl IntGetter for CompactVector {
    /// Returns the `pos`-th integer, or [`None`] if out of bounds
    /// (just wrapping [`Self::get_int()`]).
    fn get_int(&self, pos: usize) -> Option<usize> {
        self.get_int(pos)
    }
}

/// Iterator for enumerating integers, created by [`CompactVector::iter()`].
pub struct Iter<'a> {
    cv: &'a CompactVector,
    pos: usize,
}

impl<'a> Iter<'a> {
    /// Creates a new iterator.
    pub const fn new(cv: &'a CompactVector) -> Self {
        Self { cv, pos: 0 }
    }
}

impl Iterator for Iter<'_> {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.pos < self.cv.len() {
            let x = self.cv.get_int(self.pos).unwrap();
            self.pos += 1;
            Some(x)
        } else {
            None
        }
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.cv.len(), Some(self.cv.len()))
    }
}

impl std::fmt::Debug for CompactVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ints: Vec<usize> = self.iter().collect();
        f.debug_struct("CompactVector")
            .field("ints", &MatrixView::new(&ints, 16))
            .field("len", &self.len)
            .field("width", &self.width)
            .finish()
    }
}

impl Serializable for CompactVector {
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = self.chunks.serialize_into(&mut writer)?;
        mem += self.len.serialize_into(&mut writer)?;
        mem += self.width.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let chunks = BitVector::deserialize_from(&mut reader)?;
        let len = usize::deserialize_from(&mut reader)?;
        let width = usize::deserialize_from(&mut reader)?;
        Ok(Self { chunks, len, width })
    }

    fn size_in_bytes(&self) -> usize {
        self.chunks.size_in_bytes() + usize::size_of().unwrap() * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_zero_width() {
        let e = CompactVector::new(0);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("width must be in 1..=64, but got 0.".to_string())
        );
    }

    #[test]
    fn test_push_int_over_width() {
        let mut cv = CompactVector::new(3).unwrap();
        let e = cv.push_int(8);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("val must fit in self.width()=3 bits, but got 8.".to_string())
        );
    }

    #[test]
    fn test_set_int_oob() {
        let mut cv = CompactVector::new(3).unwrap();
        cv.push_int(1).unwrap();
        let e = cv.set_int(1, 0);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("pos must be no greater than self.len()=1, but got 1.".to_string())
        );
    }

    #[test]
    fn test_64_bit_width() {
        let mut cv = CompactVector::new(64).unwrap();
        cv.push_int(usize::MAX).unwrap();
        assert_eq!(cv.get_int(0), Some(usize::MAX));
    }

    #[test]
    fn test_serialize() {
        let mut bytes = vec![];
        let cv = CompactVector::from_slice(&[2u8, 5, 1, 7, 0]);
        let size = cv.serialize_into(&mut bytes).unwrap();
        let other = CompactVector::deserialize_from(&bytes[..]).unwrap();
        assert_eq!(cv, other);
        assert_eq!(size, bytes.len());
        assert_eq!(size, cv.size_in_bytes());
    }
}
