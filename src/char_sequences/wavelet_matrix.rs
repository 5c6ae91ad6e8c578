//! Time- and space-efficient data structure for a sequence of integers,
//! supporting ranking and selection queries.
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};
use std::ops::Range;

use anyhow::{anyhow, Result};

use crate::bit_vectors::{Access, BitVector, Build, NumBits, Rank, Select};
use crate::int_vectors::CompactVector;
use crate::utils;
use crate::Serializable;

/// Time- and space-efficient data structure for a sequence of integers,
/// supporting ranking and selection queries.
///
/// [`WaveletMatrix`] stores a sequence of $`n`$ integers from $`[0, \sigma)`$
/// in $`n \lg \sigma + o(n \lg \sigma)`$ bits (assuming constant-time
/// linear-space bit vectors), answering the queries in $`O(\lg \sigma)`$
/// time.
///
/// The generic parameter `B` chooses the bit vector type of the layers.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rlwt::bit_vectors::Rank9Sel;
/// use rlwt::char_sequences::WaveletMatrix;
/// use rlwt::int_vectors::CompactVector;
///
/// let text = "banana";
///
/// let mut seq = CompactVector::new(8)?;
/// seq.extend(text.chars().map(|c| c as usize))?;
/// let wm = WaveletMatrix::<Rank9Sel>::new(seq)?;
///
/// assert_eq!(wm.len(), text.len());
/// assert_eq!(wm.alph_size(), 'n' as usize + 1);
///
/// assert_eq!(wm.access(2), Some('n' as usize));
/// assert_eq!(wm.rank(3, 'a' as usize), Some(1));
/// assert_eq!(wm.select(1, 'n' as usize), Some(4));
/// assert_eq!(wm.inverse_select(3), Some((1, 'a' as usize)));
/// # Ok(())
/// # }
/// ```
///
/// # References
///
/// - F. Claude, and G. Navarro, "The Wavelet Matrix," In SPIRE 2012.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct WaveletMatrix<B> {
    layers: Vec<B>,
    alph_size: usize,
}

impl<B> WaveletMatrix<B>
where
    B: Access + Build + NumBits + Rank + Select,
{
    /// Creates a new instance from an input sequence `seq`.
    ///
    /// # Errors
    ///
    /// An error is returned if `seq` is empty or `B::build_from_bits` fails.
    pub fn new(seq: CompactVector) -> Result<Self> {
        if seq.is_empty() {
            return Err(anyhow!("seq must not be empty."));
        }

        let alph_size = seq.iter().max().unwrap() + 1;
        let alph_width = utils::needed_bits(alph_size);

        let mut zeros = seq;
        let mut ones = CompactVector::new(alph_width).unwrap();
        let mut layers = vec![];

        for depth in 0..alph_width {
            let mut next_zeros = CompactVector::new(alph_width).unwrap();
            let mut next_ones = CompactVector::new(alph_width).unwrap();
            let mut bv = BitVector::new();
            Self::filter(
                &zeros,
                alph_width - depth - 1,
                &mut next_zeros,
                &mut next_ones,
                &mut bv,
            );
            Self::filter(
                &ones,
                alph_width - depth - 1,
                &mut next_zeros,
                &mut next_ones,
                &mut bv,
            );
            zeros = next_zeros;
            ones = next_ones;
            layers.push(B::build_from_bits(bv.iter(), true, true, true)?);
        }

        Ok(Self { layers, alph_size })
    }

    fn filter(
        seq: &CompactVector,
        shift: usize,
        next_zeros: &mut CompactVector,
        next_ones: &mut CompactVector,
        bv: &mut BitVector,
    ) {
        for val in seq.iter() {
            let bit = (val >> shift) & 1 == 1;
            bv.push_bit(bit);
            // values fit in alph_width bits
            if bit {
                next_ones.push_int(val).unwrap();
            } else {
                next_zeros.push_int(val).unwrap();
            }
        }
    }

    /// Returns the `pos`-th integer, or [`None`] if `self.len() <= pos`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    #[inline(always)]
    pub fn access(&self, mut pos: usize) -> Option<usize> {
        if self.len() <= pos {
            return None;
        }
        let mut val = 0;
        for layer in &self.layers {
            val <<= 1;
            if layer.access(pos).unwrap() {
                val |= 1;
                pos = layer.rank1(pos).unwrap() + layer.num_zeros();
            } else {
                pos = layer.rank0(pos).unwrap();
            }
        }
        Some(val)
    }

    /// Returns the number of occurrences of `val` in the range `0..pos`,
    /// or [`None`] if `self.len() < pos` or `self.alph_size() <= val`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    #[inline(always)]
    pub fn rank(&self, pos: usize, val: usize) -> Option<usize> {
        self.rank_range(0..pos, val)
    }

    /// Returns the number of occurrences of `val` in the given `range`,
    /// or [`None`] if `range` or `val` is out of bounds.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    #[inline]
    pub fn rank_range(&self, range: Range<usize>, val: usize) -> Option<usize> {
        if self.alph_size() <= val {
            return None;
        }
        if range.is_empty() {
            return Some(0);
        }
        if self.len() < range.end {
            return None;
        }

        let mut start_pos = range.start;
        let mut end_pos = range.end;

        // rank is in bounds because of the prechecks
        for (depth, layer) in self.layers.iter().enumerate() {
            let bit = Self::get_msb(val, depth, self.alph_width());
            if bit {
                start_pos = layer.rank1(start_pos).unwrap() + layer.num_zeros();
                end_pos = layer.rank1(end_pos).unwrap() + layer.num_zeros();
            } else {
                start_pos = layer.rank0(start_pos).unwrap();
                end_pos = layer.rank0(end_pos).unwrap();
            }
        }
        Some(end_pos - start_pos)
    }

    /// Returns the occurrence position of the `k`-th `val` (`k` is
    /// 0-indexed), or [`None`] if there is no such occurrence.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    #[inline(always)]
    pub fn select(&self, k: usize, val: usize) -> Option<usize> {
        if self.rank(self.len(), val)? <= k {
            return None;
        }
        self.select_helper(k, val, 0, 0)
    }

    #[inline]
    fn select_helper(
        &self,
        mut k: usize,
        val: usize,
        mut pos: usize,
        depth: usize,
    ) -> Option<usize> {
        if depth == self.alph_width() {
            return Some(pos + k);
        }
        let bit = Self::get_msb(val, depth, self.alph_width());
        let layer = &self.layers[depth];
        if bit {
            let zeros = layer.num_zeros();
            pos = layer.rank1(pos).unwrap() + zeros;
            k = self.select_helper(k, val, pos, depth + 1)?;
            layer.select1(k - zeros)
        } else {
            pos = layer.rank0(pos).unwrap();
            k = self.select_helper(k, val, pos, depth + 1)?;
            layer.select0(k)
        }
    }

    /// Returns the `pos`-th integer together with the number of its
    /// occurrences in the range `0..pos`, or [`None`] if
    /// `self.len() <= pos`.
    ///
    /// The pair is computed in a single descent, which is cheaper than an
    /// [`Self::access()`] followed by a [`Self::rank()`].
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use rlwt::bit_vectors::Rank9Sel;
    /// use rlwt::char_sequences::WaveletMatrix;
    /// use rlwt::int_vectors::CompactVector;
    ///
    /// let mut seq = CompactVector::new(8)?;
    /// seq.extend("banana".chars().map(|c| c as usize))?;
    /// let wm = WaveletMatrix::<Rank9Sel>::new(seq)?;
    ///
    /// assert_eq!(wm.inverse_select(5), Some((2, 'a' as usize)));
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    pub fn inverse_select(&self, pos: usize) -> Option<(usize, usize)> {
        if self.len() <= pos {
            return None;
        }
        let mut val = 0;
        let mut start_pos = 0;
        let mut end_pos = pos;
        for layer in &self.layers {
            val <<= 1;
            if layer.access(end_pos).unwrap() {
                val |= 1;
                start_pos = layer.rank1(start_pos).unwrap() + layer.num_zeros();
                end_pos = layer.rank1(end_pos).unwrap() + layer.num_zeros();
            } else {
                start_pos = layer.rank0(start_pos).unwrap();
                end_pos = layer.rank0(end_pos).unwrap();
            }
        }
        Some((end_pos - start_pos, val))
    }

    #[inline(always)]
    const fn get_msb(val: usize, pos: usize, width: usize) -> bool {
        (val >> (width - pos - 1)) & 1 == 1
    }

    /// Creates an iterator for enumerating integers.
    pub const fn iter(&self) -> Iter<B> {
        Iter::new(self)
    }

    /// Returns the number of values stored.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.layers.first().map(|l| l.num_bits()).unwrap_or(0)
    }

    /// Checks if the sequence is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum value + 1 in the sequence, i.e., $`\sigma`$.
    #[inline(always)]
    pub const fn alph_size(&self) -> usize {
        self.alph_size
    }

    /// Returns $`\lceil \lg \sigma \rceil`$, which is the number of layers in
    /// the matrix.
    #[inline(always)]
    pub fn alph_width(&self) -> usize {
        self.layers.len()
    }
}

/// Iterator for enumerating integers, created by [`WaveletMatrix::iter()`].
pub struct Iter<'a, B> {
    wm: &'a WaveletMatrix<B>,
    pos: usize,
}

impl<'a, B> Iter<'a, B> {
    /// Creates a new iterator.
    pub const fn new(wm: &'a WaveletMatrix<B>) -> Self {
        Self { wm, pos: 0 }
    }
}

impl<B> Iterator for Iter<'_, B>
where
    B: Access + Build + NumBits + Rank + Select,
{
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.pos < self.wm.len() {
            let x = self.wm.access(self.pos).unwrap();
            self.pos += 1;
            Some(x)
        } else {
            None
        }
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.wm.len(), Some(self.wm.len()))
    }
}

impl<B> Serializable for WaveletMatrix<B>
where
    B: Serializable,
{
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = self.layers.serialize_into(&mut writer)?;
        mem += self.alph_size.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let layers = Vec::<B>::deserialize_from(&mut reader)?;
        let alph_size = usize::deserialize_from(&mut reader)?;
        Ok(Self { layers, alph_size })
    }

    fn size_in_bytes(&self) -> usize {
        self.layers.size_in_bytes() + usize::size_of().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    use crate::bit_vectors::Rank9Sel;

    fn build(text: &str) -> WaveletMatrix<Rank9Sel> {
        let mut seq = CompactVector::new(8).unwrap();
        seq.extend(text.chars().map(|c| c as usize)).unwrap();
        WaveletMatrix::new(seq).unwrap()
    }

    #[test]
    fn test_empty_seq() {
        let e = WaveletMatrix::<Rank9Sel>::new(CompactVector::new(1).unwrap());
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("seq must not be empty.".to_string())
        );
    }

    #[test]
    fn test_navarro_book() {
        // This test example is from G. Navarro's "Compact Data Structures" P130
        let text = "tobeornottobethatisthequestion";
        let wm = build(text);

        assert_eq!(wm.len(), text.len());
        assert_eq!(wm.alph_size(), 'u' as usize + 1);
        assert_eq!(wm.alph_width(), 7);

        assert_eq!(wm.access(20), Some('h' as usize));
        assert_eq!(wm.rank(22, 'o' as usize), Some(4));
        assert_eq!(wm.select(2, 't' as usize), Some(9));
    }

    #[test]
    fn test_out_of_alphabet() {
        let wm = build("banana");
        assert_eq!(wm.rank(6, 'z' as usize), None);
        assert_eq!(wm.select(0, 'z' as usize), None);
        // Unused value inside the alphabet range.
        assert_eq!(wm.rank(6, 'c' as usize), Some(0));
        assert_eq!(wm.select(0, 'c' as usize), None);
    }

    #[test]
    fn test_inverse_select_matches_access_rank() {
        let wm = build("abracadabra");
        for pos in 0..wm.len() {
            let (rank, val) = wm.inverse_select(pos).unwrap();
            assert_eq!(wm.access(pos), Some(val));
            assert_eq!(wm.rank(pos, val), Some(rank));
        }
        assert_eq!(wm.inverse_select(wm.len()), None);
    }

    #[test]
    fn test_against_naive_random() {
        let mut rng = ChaChaRng::seed_from_u64(11);
        for _ in 0..5 {
            let seq: Vec<usize> = (0..1000).map(|_| rng.gen_range(0..64)).collect();
            let mut cv = CompactVector::new(8).unwrap();
            cv.extend(seq.iter().copied()).unwrap();
            let wm = WaveletMatrix::<Rank9Sel>::new(cv).unwrap();

            let mut occurrences = vec![vec![]; 64];
            let mut counts = vec![0; 64];
            for (i, &v) in seq.iter().enumerate() {
                assert_eq!(wm.access(i), Some(v));
                assert_eq!(wm.rank(i, v), Some(counts[v]));
                occurrences[v].push(i);
                counts[v] += 1;
            }
            for v in 0..64 {
                for (k, &i) in occurrences[v].iter().enumerate() {
                    assert_eq!(wm.select(k, v), Some(i));
                }
                assert_eq!(wm.select(occurrences[v].len(), v), None);
            }
        }
    }

    #[test]
    fn test_serialize() {
        let wm = build("tobeornottobethatisthequestion");
        let mut bytes = vec![];
        let size = wm.serialize_into(&mut bytes).unwrap();
        let other = WaveletMatrix::deserialize_from(&bytes[..]).unwrap();
        assert_eq!(wm, other);
        assert_eq!(size, bytes.len());
        assert_eq!(size, wm.size_in_bytes());
    }
}
