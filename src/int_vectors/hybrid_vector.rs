//! Two-tier integer vector for mostly-small values with rare large
//! exceptions.
#![cfg(target_pointer_width = "64")]

use std::collections::BTreeMap;
use std::io::{Read, Write};

use anyhow::{anyhow, Result};

use crate::int_vectors::prelude::*;
use crate::int_vectors::CompactVector;
use crate::Serializable;

/// Two-tier integer vector for sequences in which most values are small and
/// a few need up to 64 bits.
///
/// Values no greater than the threshold $`\tau = 2^w - 2`$ live in a packed
/// primary array of width $`w \in \{8, 16, 32\}`$. A larger value leaves the
/// sentinel $`\tau + 1`$ in its primary slot and is stored in full in an
/// exception map keyed by position.
///
/// Every sentinel slot has its exception entry; this is an invariant of
/// construction, enforced again when deserializing.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rlwt::int_vectors::HybridVector;
///
/// let hv = HybridVector::from_ints([3, 254, 1 << 40, 0], 8)?;
///
/// assert_eq!(hv.len(), 4);
/// assert_eq!(hv.get(0), Some(3));
/// assert_eq!(hv.get(1), Some(254));
/// assert_eq!(hv.get(2), Some(1 << 40));
/// assert_eq!(hv.get(4), None);
/// assert_eq!(hv.num_exceptions(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct HybridVector {
    primary: CompactVector,
    exceptions: BTreeMap<usize, u64>,
}

impl HybridVector {
    /// Creates a new vector from an ordered sequence of integers `vals`.
    ///
    /// # Arguments
    ///
    /// - `vals`: Integers to be stored, in order.
    /// - `width`: Number of bits of a primary slot, one of 8, 16, or 32.
    ///
    /// # Errors
    ///
    /// An error is returned if `width` is not one of 8, 16, or 32.
    pub fn from_ints<I>(vals: I, width: usize) -> Result<Self>
    where
        I: IntoIterator<Item = u64>,
    {
        if !matches!(width, 8 | 16 | 32) {
            return Err(anyhow!("width must be one of 8, 16, or 32, but got {width}."));
        }
        let threshold = Self::threshold_for(width);
        let mut primary = CompactVector::new(width).unwrap();
        let mut exceptions = BTreeMap::new();
        for (i, val) in vals.into_iter().enumerate() {
            if val <= threshold {
                primary.push_int(val as usize).unwrap();
            } else {
                exceptions.insert(i, val);
                primary.push_int((threshold + 1) as usize).unwrap();
            }
        }
        Ok(Self {
            primary,
            exceptions,
        })
    }

    /// Returns the `pos`-th integer, or [`None`] if out of bounds.
    ///
    /// # Panics
    ///
    /// It panics if the primary slot holds the sentinel but the exception map
    /// has no entry for `pos`, which indicates a corrupted structure.
    ///
    /// # Complexity
    ///
    /// Constant for small values; $`O(\lg e)`$ for $`e`$ exceptions.
    pub fn get(&self, pos: usize) -> Option<u64> {
        let val = self.primary.get_int(pos)? as u64;
        if val <= self.threshold() {
            Some(val)
        } else {
            match self.exceptions.get(&pos) {
                Some(&x) => Some(x),
                None => panic!("no exception entry for sentinel slot {pos}."),
            }
        }
    }

    /// Gets the number of integers.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.primary.len()
    }

    /// Checks if the vector is empty.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the number of bits of a primary slot.
    #[inline(always)]
    pub const fn width(&self) -> usize {
        self.primary.width()
    }

    /// Gets the number of values stored in the exception map.
    #[inline(always)]
    pub fn num_exceptions(&self) -> usize {
        self.exceptions.len()
    }

    /// Returns the largest value representable in a primary slot.
    #[inline(always)]
    pub const fn threshold(&self) -> u64 {
        Self::threshold_for(self.width())
    }

    const fn threshold_for(width: usize) -> u64 {
        (1 << width) - 2
    }
}

impl IntGetter for HybridVector {
    /// Returns the `pos`-th integer, or [`None`] if out of bounds
    /// (just wrapping [`Self::get()`]).
    fn get_int(&self, pos: usize) -> Option<usize> {
        self.get(pos).map(|x| x as usize)
    }
}

impl Serializable for HybridVector {
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let positions: Vec<usize> = self.exceptions.keys().copied().collect();
        let values: Vec<u64> = self.exceptions.values().copied().collect();
        let mut mem = self.primary.serialize_into(&mut writer)?;
        mem += positions.serialize_into(&mut writer)?;
        mem += values.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let primary = CompactVector::deserialize_from(&mut reader)?;
        let positions = Vec::<usize>::deserialize_from(&mut reader)?;
        let values = Vec::<u64>::deserialize_from(&mut reader)?;
        if positions.len() != values.len() {
            return Err(anyhow!(
                "lengths of exception positions and values must match, but got {} and {}.",
                positions.len(),
                values.len()
            ));
        }
        if !matches!(primary.width(), 8 | 16 | 32) {
            return Err(anyhow!(
                "width must be one of 8, 16, or 32, but got {}.",
                primary.width()
            ));
        }
        let sentinel = (Self::threshold_for(primary.width()) + 1) as usize;
        for &pos in &positions {
            if primary.get_int(pos) != Some(sentinel) {
                return Err(anyhow!(
                    "exception position {pos} does not point at a sentinel slot."
                ));
            }
        }
        let num_sentinels = primary.iter().filter(|&x| x == sentinel).count();
        if num_sentinels != positions.len() {
            return Err(anyhow!(
                "every sentinel slot must have an exception entry, but {} slots have {} entries.",
                num_sentinels,
                positions.len()
            ));
        }
        let exceptions = positions.into_iter().zip(values).collect();
        Ok(Self {
            primary,
            exceptions,
        })
    }

    fn size_in_bytes(&self) -> usize {
        self.primary.size_in_bytes()
            + usize::size_of().unwrap() * 2
            + (usize::size_of().unwrap() + u64::size_of().unwrap()) * self.exceptions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    #[test]
    fn test_invalid_width() {
        let e = HybridVector::from_ints([1, 2, 3], 12);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("width must be one of 8, 16, or 32, but got 12.".to_string())
        );
    }

    #[test]
    fn test_empty() {
        let hv = HybridVector::from_ints([], 16).unwrap();
        assert!(hv.is_empty());
        assert_eq!(hv.len(), 0);
        assert_eq!(hv.get(0), None);
    }

    #[test]
    fn test_threshold_boundary() {
        // 254 fits in a w=8 slot; 255 and up become exceptions.
        let hv = HybridVector::from_ints([253, 254, 255, 256], 8).unwrap();
        assert_eq!(hv.get(0), Some(253));
        assert_eq!(hv.get(1), Some(254));
        assert_eq!(hv.get(2), Some(255));
        assert_eq!(hv.get(3), Some(256));
        assert_eq!(hv.num_exceptions(), 2);
    }

    #[test]
    fn test_wider_slots() {
        for width in [16, 32] {
            let tau = (1u64 << width) - 2;
            let hv = HybridVector::from_ints([0, tau, tau + 1, u64::MAX], width).unwrap();
            assert_eq!(hv.get(0), Some(0));
            assert_eq!(hv.get(1), Some(tau));
            assert_eq!(hv.get(2), Some(tau + 1));
            assert_eq!(hv.get(3), Some(u64::MAX));
            assert_eq!(hv.num_exceptions(), 2);
        }
    }

    #[test]
    fn test_random_values() {
        let mut rng = ChaChaRng::seed_from_u64(23);
        let vals: Vec<u64> = (0..5000)
            .map(|_| {
                if rng.gen_bool(0.05) {
                    rng.gen::<u64>()
                } else {
                    rng.gen_range(0..255)
                }
            })
            .collect();
        let hv = HybridVector::from_ints(vals.iter().copied(), 8).unwrap();
        for (i, &v) in vals.iter().enumerate() {
            assert_eq!(hv.get(i), Some(v));
        }
        assert_eq!(hv.get(vals.len()), None);
    }

    #[test]
    fn test_serialize() {
        let hv = HybridVector::from_ints([3, 1000, 254, 1 << 50], 8).unwrap();
        let mut bytes = vec![];
        let size = hv.serialize_into(&mut bytes).unwrap();
        let other = HybridVector::deserialize_from(&bytes[..]).unwrap();
        assert_eq!(hv, other);
        assert_eq!(size, bytes.len());
        assert_eq!(size, hv.size_in_bytes());
    }

    #[test]
    fn test_deserialize_missing_exception() {
        // Drop the exception entry, keeping the sentinel slot.
        let mut broken = HybridVector::from_ints([3, 1000], 8).unwrap();
        broken.exceptions.clear();
        let mut bytes = vec![];
        broken.serialize_into(&mut bytes).unwrap();
        let e = HybridVector::deserialize_from(&bytes[..]);
        assert!(e.is_err());
    }
}
