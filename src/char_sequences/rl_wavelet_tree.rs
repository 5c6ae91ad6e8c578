//! Run-length encoded wavelet tree over byte sequences.
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::bit_vectors::{BitVector, NumBits, Rank, Rank9Sel, RsVector, RsVectorKind, Select};
use crate::char_sequences::WaveletMatrix;
use crate::error::{Error, Result};
use crate::int_vectors::CompactVector;
use crate::Serializable;

const MAGIC: [u8; 8] = *b"RLWT\x00\x00\x00\x01";
const DEFAULT_BLOCK_LEN: usize = 64 * 1024;

/// Source of the input byte sequence for construction.
///
/// A source is consumed in forward-only blocks and must be rewindable,
/// because construction makes two streaming passes. The whole sequence never
/// needs to fit in memory at once.
pub trait TextSource {
    /// Rewinds the source to the beginning of the sequence.
    fn reset(&mut self) -> std::io::Result<()>;

    /// Returns the next block of bytes, or [`None`] at the end of the
    /// sequence.
    fn next_block(&mut self) -> std::io::Result<Option<&[u8]>>;
}

/// [`TextSource`] over an in-memory byte slice.
pub struct SliceSource<'a> {
    text: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Creates a source reading `text` in fixed-size blocks.
    pub const fn new(text: &'a [u8]) -> Self {
        Self { text, pos: 0 }
    }
}

impl TextSource for SliceSource<'_> {
    fn reset(&mut self) -> std::io::Result<()> {
        self.pos = 0;
        Ok(())
    }

    fn next_block(&mut self) -> std::io::Result<Option<&[u8]>> {
        if self.pos == self.text.len() {
            return Ok(None);
        }
        let end = self.text.len().min(self.pos + DEFAULT_BLOCK_LEN);
        let block = &self.text[self.pos..end];
        self.pos = end;
        Ok(Some(block))
    }
}

/// [`TextSource`] over a seekable reader, e.g., a file.
pub struct ReadSource<R> {
    reader: R,
    buf: Vec<u8>,
    filled: usize,
}

impl<R: Read + Seek> ReadSource<R> {
    /// Creates a source reading from `reader` in fixed-size blocks.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: vec![0; DEFAULT_BLOCK_LEN],
            filled: 0,
        }
    }
}

impl<R: Read + Seek> TextSource for ReadSource<R> {
    fn reset(&mut self) -> std::io::Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    fn next_block(&mut self) -> std::io::Result<Option<&[u8]>> {
        self.filled = self.reader.read(&mut self.buf)?;
        if self.filled == 0 {
            Ok(None)
        } else {
            Ok(Some(&self.buf[..self.filled]))
        }
    }
}

/// Run-length encoded wavelet tree over a byte sequence, after Mäkinen and
/// Navarro.
///
/// Given a sequence $`T`$ of $`n`$ bytes with $`r`$ maximal runs of equal
/// bytes, only the run heads are kept in a [`WaveletMatrix`]. Two bit
/// vectors align the remaining positional information: `bl` marks run starts
/// in $`T`$ itself, and `bf` marks, in the stably-sorted view of $`T`$, the
/// first sorted position fed by each run, closed by a sentinel. A rank over
/// `bf` at each byte's start offset (`c_bf_rank`) translates between the
/// per-byte and global numbering of run marks.
///
/// The three positional queries then run in $`O(\lg \sigma)`$ time while the
/// space depends on $`r`$ rather than $`n`$: both bit vectors default to the
/// Elias-Fano flavor of [`RsVector`], which is compressed when
/// $`r \ll n`$.
///
/// Queries need only `&self` and a built tree can be shared freely across
/// threads. All component structures own their backing bits, so moves,
/// clones, [`Self::swap()`], and deserialization cannot leave a support
/// pointing at a stale vector.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rlwt::char_sequences::RlWaveletTree;
///
/// let wt = RlWaveletTree::from_bytes(b"abracadabra")?;
///
/// assert_eq!(wt.len(), 11);
/// assert_eq!(wt.access(3)?, b'a');
/// assert_eq!(wt.rank(11, b'a')?, 5);
/// assert_eq!(wt.select(2, b'r')?, 9);
/// assert_eq!(wt.inverse_select(7)?, (3, b'a'));
/// # Ok(())
/// # }
/// ```
///
/// # References
///
///  - V. Mäkinen, and G. Navarro, "Succinct Suffix Arrays Based on
///    Run-Length Encoding," In CPM 2005.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RlWaveletTree {
    // None until a constructor or loader has run.
    inner: Option<Inner>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Inner {
    len: usize,
    sigma: usize,
    bl: RsVector,
    bf: RsVector,
    wt: Option<WaveletMatrix<Rank9Sel>>, // None iff len == 0
    c: Vec<usize>,                       // exclusive prefix counts, 256 entries
    c_bf_rank: Vec<usize>,               // rank1(bf, c[b]) per byte b
}

impl Inner {
    /// Number of occurrences of byte `b` in the whole sequence.
    #[inline(always)]
    fn occ(&self, b: usize) -> usize {
        let next = if b + 1 < 256 { self.c[b + 1] } else { self.len };
        next - self.c[b]
    }

    /// The wavelet matrix of run heads; present whenever `len > 0`.
    #[inline(always)]
    fn wt(&self) -> &WaveletMatrix<Rank9Sel> {
        self.wt.as_ref().unwrap()
    }
}

impl RlWaveletTree {
    /// Builds the tree from an in-memory byte sequence with the default
    /// (Elias-Fano) bit vector flavors.
    ///
    /// # Errors
    ///
    /// See [`Self::from_source_with()`].
    pub fn from_bytes(text: &[u8]) -> Result<Self> {
        Self::from_source(&mut SliceSource::new(text))
    }

    /// Builds the tree from a rewindable block source with the default
    /// (Elias-Fano) bit vector flavors.
    ///
    /// # Errors
    ///
    /// See [`Self::from_source_with()`].
    pub fn from_source<S>(src: &mut S) -> Result<Self>
    where
        S: TextSource + ?Sized,
    {
        Self::from_source_with(src, RsVectorKind::Sparse, RsVectorKind::Sparse, None)
    }

    /// Builds the tree from a rewindable block source.
    ///
    /// # Arguments
    ///
    /// - `src`: Input sequence, read in two streaming passes.
    /// - `bl_kind`: Flavor of the run-start bit vector.
    /// - `bf_kind`: Flavor of the sorted-view bit vector.
    /// - `cancel`: Cooperative cancellation flag, checked at block
    ///   boundaries.
    ///
    /// # Errors
    ///
    /// An error is returned if
    ///
    /// - the source reports an I/O error ([`Error::Io`]),
    /// - `cancel` becomes set ([`Error::Cancelled`]), or
    /// - the source yields different contents in the two passes
    ///   ([`Error::MalformedInput`]).
    pub fn from_source_with<S>(
        src: &mut S,
        bl_kind: RsVectorKind,
        bf_kind: RsVectorKind,
        cancel: Option<&AtomicBool>,
    ) -> Result<Self>
    where
        S: TextSource + ?Sized,
    {
        // Pass 1: run starts, run heads, and byte frequencies.
        src.reset()?;
        let mut bl_plain = BitVector::new();
        let mut heads = CompactVector::new(8).unwrap();
        let mut counts = vec![0usize; 256];
        let mut last = 0u8;
        let mut len = 0usize;
        while let Some(block) = src.next_block()? {
            if is_cancelled(cancel) {
                return Err(Error::Cancelled);
            }
            for &b in block {
                let is_head = len == 0 || b != last;
                bl_plain.push_bit(is_head);
                if is_head {
                    // a byte always fits in the 8-bit cells
                    heads.push_int(b as usize).unwrap();
                }
                counts[b as usize] += 1;
                last = b;
                len += 1;
            }
        }
        debug_assert!(len < 1 << 63);

        let mut c = vec![0usize; 256];
        let mut prefix_sum = 0;
        for (b, &cnt) in counts.iter().enumerate() {
            c[b] = prefix_sum;
            prefix_sum += cnt;
        }
        let sigma = counts.iter().filter(|&&cnt| cnt != 0).count();

        // Pass 2: first sorted position fed by each run, plus the sentinel.
        src.reset()?;
        let mut lf_map = c.clone();
        let mut bf_plain = BitVector::from_bit(false, len + 1);
        bf_plain.set_bit(len, true).unwrap();
        let mut pos = 0;
        while let Some(block) = src.next_block()? {
            if is_cancelled(cancel) {
                return Err(Error::Cancelled);
            }
            for &b in block {
                if pos == len {
                    return Err(Error::MalformedInput(
                        "source yielded more bytes in the second pass".to_owned(),
                    ));
                }
                if bl_plain.get_bit(pos).unwrap() {
                    // lf_map[b] < len whenever byte b occurs
                    bf_plain.set_bit(lf_map[b as usize], true).unwrap();
                }
                lf_map[b as usize] += 1;
                pos += 1;
            }
        }
        if pos != len {
            return Err(Error::MalformedInput(
                "source yielded fewer bytes in the second pass".to_owned(),
            ));
        }

        let bl = RsVector::build_from_bits(bl_plain.iter(), bl_kind);
        let bf = RsVector::build_from_bits(bf_plain.iter(), bf_kind);
        let wt = if len == 0 {
            None
        } else {
            // heads is non-empty and 8-bit wide, so the build cannot fail
            Some(WaveletMatrix::new(heads).unwrap())
        };
        // c[b] <= len < bf.num_bits(), so rank1 is in bounds
        let c_bf_rank = c.iter().map(|&off| bf.rank1(off).unwrap()).collect();

        Ok(Self {
            inner: Some(Inner {
                len,
                sigma,
                bl,
                bf,
                wt,
                c,
                c_bf_rank,
            }),
        })
    }

    /// Returns the length of the indexed sequence.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, |x| x.len)
    }

    /// Checks if the indexed sequence is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of distinct bytes in the indexed sequence.
    #[inline(always)]
    pub fn sigma(&self) -> usize {
        self.inner.as_ref().map_or(0, |x| x.sigma)
    }

    /// Returns the number of maximal equal-byte runs in the indexed sequence.
    #[inline(always)]
    pub fn num_runs(&self) -> usize {
        self.inner.as_ref().map_or(0, |x| x.bl.num_ones())
    }

    /// Exchanges the contents of two trees.
    ///
    /// Every component owns its backing bits, so both trees answer queries
    /// correctly afterwards.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    fn inner(&self) -> Result<&Inner> {
        self.inner.as_ref().ok_or(Error::Uninitialized)
    }

    /// Returns the `pos`-th byte of the sequence.
    ///
    /// # Errors
    ///
    /// [`Error::Uninitialized`] on a default-constructed tree, or
    /// [`Error::OutOfRange`] if `self.len() <= pos`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$ on average
    pub fn access(&self, pos: usize) -> Result<u8> {
        let x = self.inner()?;
        if x.len <= pos {
            return Err(Error::OutOfRange(pos));
        }
        // rank1 >= 1 because bl[0] is set
        let head = x.bl.rank1(pos + 1).unwrap() - 1;
        Ok(x.wt().access(head).unwrap() as u8)
    }

    /// Returns the number of occurrences of byte `b` in the prefix of length
    /// `pos`.
    ///
    /// # Errors
    ///
    /// [`Error::Uninitialized`] on a default-constructed tree, or
    /// [`Error::OutOfRange`] if `self.len() < pos`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$ on average
    pub fn rank(&self, pos: usize, b: u8) -> Result<usize> {
        let x = self.inner()?;
        if x.len < pos {
            return Err(Error::OutOfRange(pos));
        }
        let b = b as usize;
        if pos == 0 || x.occ(b) == 0 {
            return Ok(0);
        }
        let wt_ex_pos = x.bl.rank1(pos).unwrap();
        let c_runs = x.wt().rank(wt_ex_pos, b).unwrap();
        if c_runs == 0 {
            return Ok(0);
        }
        if x.wt().access(wt_ex_pos - 1).unwrap() == b {
            // The run covering pos - 1 is a b-run: full earlier b-runs are
            // counted through the sorted view, then the partial run is added.
            let c_run_begin = x.bl.select1(wt_ex_pos - 1).unwrap();
            let full = x.bf.select1(x.c_bf_rank[b] + c_runs - 1).unwrap() - x.c[b];
            Ok(full + pos - c_run_begin)
        } else {
            // Skip to the mark closing the last b-run that ends before pos.
            Ok(x.bf.select1(x.c_bf_rank[b] + c_runs).unwrap() - x.c[b])
        }
    }

    /// Returns the `pos`-th byte of the sequence together with the number of
    /// its occurrences in the prefix of length `pos`, cheaper than an
    /// [`Self::access()`] followed by a [`Self::rank()`].
    ///
    /// # Errors
    ///
    /// [`Error::Uninitialized`] on a default-constructed tree, or
    /// [`Error::OutOfRange`] if `self.len() <= pos`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$ on average
    pub fn inverse_select(&self, pos: usize) -> Result<(usize, u8)> {
        let x = self.inner()?;
        if x.len <= pos {
            return Err(Error::OutOfRange(pos));
        }
        if pos == 0 {
            return Ok((0, x.wt().access(0).unwrap() as u8));
        }
        let wt_ex_pos = x.bl.rank1(pos + 1).unwrap();
        let (head_rank, b) = x.wt().inverse_select(wt_ex_pos - 1).unwrap();
        // The run covering pos is a b-run by definition, so the counting
        // mirrors the first branch of rank() with that run included.
        let c_runs = head_rank + 1;
        let c_run_begin = x.bl.select1(wt_ex_pos - 1).unwrap();
        let full = x.bf.select1(x.c_bf_rank[b] + c_runs - 1).unwrap() - x.c[b];
        Ok((full + pos - c_run_begin, b as u8))
    }

    /// Returns the position of the `k`-th occurrence of byte `b`, where `k`
    /// is 1-indexed.
    ///
    /// # Errors
    ///
    /// [`Error::Uninitialized`] on a default-constructed tree, or
    /// [`Error::OutOfRange`] if `k == 0` or `k` exceeds the number of
    /// occurrences of `b`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$ on average
    pub fn select(&self, k: usize, b: u8) -> Result<usize> {
        let x = self.inner()?;
        let b = b as usize;
        if k == 0 || x.occ(b) < k {
            return Err(Error::OutOfRange(k));
        }
        // The k-th b lies in the c_runs-th b-run (1-indexed); its displacement
        // inside that run is recovered in the sorted view, and the run start
        // in the original sequence comes from the run-head position.
        let c_runs = x.bf.rank1(x.c[b] + k).unwrap() - x.c_bf_rank[b];
        let offset = x.c[b] + k - 1 - x.bf.select1(x.c_bf_rank[b] + c_runs - 1).unwrap();
        let head = x.wt().select(c_runs - 1, b).unwrap();
        Ok(x.bl.select1(head).unwrap() + offset)
    }
}

#[inline(always)]
fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.map_or(false, |c| c.load(Ordering::Relaxed))
}

impl Serializable for RlWaveletTree {
    fn serialize_into<W: Write>(&self, mut writer: W) -> anyhow::Result<usize> {
        let x = self.inner.as_ref().ok_or(Error::Uninitialized)?;

        writer.write_all(&MAGIC)?;
        let mut mem = MAGIC.len();
        mem += (x.len as u64).serialize_into(&mut writer)?;
        mem += (x.sigma as u32).serialize_into(&mut writer)?;
        mem += (x.bl.kind() as u8).serialize_into(&mut writer)?;
        mem += (x.bf.kind() as u8).serialize_into(&mut writer)?;
        writer.write_all(&[0u8; 2])?; // padding to an 8-byte boundary
        mem += 2;

        let mut bytes = vec![];
        x.bl.serialize_into(&mut bytes)?;
        mem += write_section(&mut writer, &bytes)?;

        bytes.clear();
        x.bf.serialize_into(&mut bytes)?;
        mem += write_section(&mut writer, &bytes)?;

        bytes.clear();
        x.wt.serialize_into(&mut bytes)?;
        mem += write_section(&mut writer, &bytes)?;

        for &v in &x.c {
            mem += (v as u64).serialize_into(&mut writer)?;
        }
        for &v in &x.c_bf_rank {
            mem += (v as u64).serialize_into(&mut writer)?;
        }
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> anyhow::Result<Self> {
        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(Error::MalformedInput(format!("bad magic: {magic:02x?}")).into());
        }
        let len = u64::deserialize_from(&mut reader)? as usize;
        let sigma = u32::deserialize_from(&mut reader)? as usize;
        let bl_kind = RsVectorKind::from_u8(u8::deserialize_from(&mut reader)?)
            .map_err(|e| Error::MalformedInput(e.to_string()))?;
        let bf_kind = RsVectorKind::from_u8(u8::deserialize_from(&mut reader)?)
            .map_err(|e| Error::MalformedInput(e.to_string()))?;
        let mut pad = [0u8; 2];
        reader.read_exact(&mut pad)?;

        let bl = RsVector::deserialize_from(&read_section(&mut reader)?[..])?;
        let bf = RsVector::deserialize_from(&read_section(&mut reader)?[..])?;
        let wt =
            Option::<WaveletMatrix<Rank9Sel>>::deserialize_from(&read_section(&mut reader)?[..])?;
        let mut c = Vec::with_capacity(256);
        for _ in 0..256 {
            c.push(u64::deserialize_from(&mut reader)? as usize);
        }
        let mut c_bf_rank = Vec::with_capacity(256);
        for _ in 0..256 {
            c_bf_rank.push(u64::deserialize_from(&mut reader)? as usize);
        }

        if bl.kind() != bl_kind || bf.kind() != bf_kind {
            return Err(
                Error::MalformedInput("header kinds disagree with payloads".to_owned()).into(),
            );
        }
        if bl.num_bits() != len || bf.num_bits() != len + 1 {
            return Err(
                Error::MalformedInput("bit vector lengths disagree with len".to_owned()).into(),
            );
        }
        if bf.num_ones() != bl.num_ones() + 1 {
            return Err(Error::MalformedInput(
                "sorted-view marks must exceed run marks by the sentinel".to_owned(),
            )
            .into());
        }
        match &wt {
            Some(wm) if len > 0 => {
                if wm.len() != bl.num_ones() {
                    return Err(Error::MalformedInput(
                        "run-head count disagrees with run marks".to_owned(),
                    )
                    .into());
                }
            }
            None if len == 0 => {}
            _ => {
                return Err(Error::MalformedInput(
                    "run-head sequence presence disagrees with len".to_owned(),
                )
                .into());
            }
        }
        if sigma > 256 {
            return Err(Error::MalformedInput(format!("sigma {sigma} exceeds 256")).into());
        }
        // Rebinds the translation table to the freshly loaded bit vector and
        // validates it at the same time.
        for b in 0..256 {
            if bf.rank1(c[b]) != Some(c_bf_rank[b]) {
                return Err(Error::MalformedInput(format!(
                    "c_bf_rank[{b}] disagrees with the sorted-view marks"
                ))
                .into());
            }
        }

        Ok(Self {
            inner: Some(Inner {
                len,
                sigma,
                bl,
                bf,
                wt,
                c,
                c_bf_rank,
            }),
        })
    }

    fn size_in_bytes(&self) -> usize {
        self.inner.as_ref().map_or(0, |x| {
            24 // magic, len, sigma, kinds, padding
                + 8 + x.bl.size_in_bytes()
                + 8 + x.bf.size_in_bytes()
                + 8 + x.wt.size_in_bytes()
                + 256 * 8 * 2
        })
    }
}

fn write_section<W: Write>(mut writer: W, bytes: &[u8]) -> anyhow::Result<usize> {
    let mut mem = (bytes.len() as u64).serialize_into(&mut writer)?;
    writer.write_all(bytes)?;
    mem += bytes.len();
    Ok(mem)
}

fn read_section<R: Read>(mut reader: R) -> anyhow::Result<Vec<u8>> {
    let len = u64::deserialize_from(&mut reader)? as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    use crate::bit_vectors::Access;

    fn naive_runs(text: &[u8]) -> usize {
        text.windows(2).filter(|w| w[0] != w[1]).count() + usize::from(!text.is_empty())
    }

    fn check_against_naive(wt: &RlWaveletTree, text: &[u8]) {
        assert_eq!(wt.len(), text.len());
        assert_eq!(wt.num_runs(), naive_runs(text));

        let mut counts = vec![0usize; 256];
        let mut occurrences = vec![vec![]; 256];
        for (i, &b) in text.iter().enumerate() {
            assert_eq!(wt.access(i).unwrap(), b);
            assert_eq!(wt.inverse_select(i).unwrap(), (counts[b as usize], b));
            counts[b as usize] += 1;
            occurrences[b as usize].push(i);
        }
        for b in 0..256 {
            let b = b as u8;
            let mut rank = 0;
            for i in 0..=text.len() {
                assert_eq!(wt.rank(i, b).unwrap(), rank);
                if i < text.len() && text[i] == b {
                    rank += 1;
                }
            }
            for (k, &i) in occurrences[b as usize].iter().enumerate() {
                assert_eq!(wt.select(k + 1, b).unwrap(), i);
            }
            let over = occurrences[b as usize].len() + 1;
            assert!(matches!(wt.select(over, b), Err(Error::OutOfRange(_))));
        }
    }

    #[test]
    fn test_uninitialized() {
        let wt = RlWaveletTree::default();
        assert_eq!(wt.len(), 0);
        assert!(wt.is_empty());
        assert!(matches!(wt.access(0), Err(Error::Uninitialized)));
        assert!(matches!(wt.rank(0, b'a'), Err(Error::Uninitialized)));
        assert!(matches!(wt.select(1, b'a'), Err(Error::Uninitialized)));
        assert!(matches!(wt.inverse_select(0), Err(Error::Uninitialized)));
        let mut bytes = vec![];
        assert!(wt.serialize_into(&mut bytes).is_err());
    }

    #[test]
    fn test_empty_text() {
        let wt = RlWaveletTree::from_bytes(b"").unwrap();
        assert_eq!(wt.len(), 0);
        assert!(wt.is_empty());
        assert_eq!(wt.sigma(), 0);
        assert_eq!(wt.num_runs(), 0);
        assert!(matches!(wt.access(0), Err(Error::OutOfRange(0))));
        assert_eq!(wt.rank(0, b'a').unwrap(), 0);
        assert!(matches!(wt.rank(1, b'a'), Err(Error::OutOfRange(1))));
        assert!(matches!(wt.select(1, b'a'), Err(Error::OutOfRange(1))));
    }

    #[test]
    fn test_single_run() {
        let wt = RlWaveletTree::from_bytes(b"aaaa").unwrap();
        assert_eq!(wt.len(), 4);
        assert_eq!(wt.sigma(), 1);
        assert_eq!(wt.num_runs(), 1);
        for i in 0..4 {
            assert_eq!(wt.access(i).unwrap(), b'a');
        }
        assert_eq!(wt.rank(4, b'a').unwrap(), 4);
        assert_eq!(wt.rank(4, b'b').unwrap(), 0);
        assert_eq!(wt.select(1, b'a').unwrap(), 0);
        assert_eq!(wt.select(4, b'a').unwrap(), 3);
        assert!(matches!(wt.select(5, b'a'), Err(Error::OutOfRange(5))));
        assert!(matches!(wt.select(0, b'a'), Err(Error::OutOfRange(0))));
    }

    #[test]
    fn test_abracadabra() {
        let wt = RlWaveletTree::from_bytes(b"abracadabra").unwrap();
        assert_eq!(wt.access(0).unwrap(), b'a');
        assert_eq!(wt.access(3).unwrap(), b'a');
        assert_eq!(wt.rank(11, b'a').unwrap(), 5);
        assert_eq!(wt.rank(11, b'b').unwrap(), 2);
        assert_eq!(wt.select(5, b'a').unwrap(), 10);
        assert_eq!(wt.select(2, b'r').unwrap(), 9);
        // T[7] is the fourth 'a', so three occurrences precede it.
        assert_eq!(wt.inverse_select(7).unwrap(), (3, b'a'));
        check_against_naive(&wt, b"abracadabra");
    }

    #[test]
    fn test_mississippi() {
        let wt = RlWaveletTree::from_bytes(b"mississippi").unwrap();
        assert_eq!(wt.rank(11, b's').unwrap(), 4);
        assert_eq!(wt.select(3, b's').unwrap(), 5);
        assert_eq!(wt.select(4, b'i').unwrap(), 10);
        check_against_naive(&wt, b"mississippi");
    }

    #[test]
    fn test_long_single_run() {
        let text = vec![0u8; 100_000];
        let wt = RlWaveletTree::from_bytes(&text).unwrap();
        assert_eq!(wt.len(), 100_000);
        assert_eq!(wt.num_runs(), 1);
        for i in (0..100_000).step_by(997) {
            assert_eq!(wt.access(i).unwrap(), 0);
            assert_eq!(wt.rank(i, 0).unwrap(), i);
        }
        for k in (1..=100_000).step_by(997) {
            assert_eq!(wt.select(k, 0).unwrap(), k - 1);
        }
        assert_eq!(wt.rank(100_000, 0).unwrap(), 100_000);
    }

    #[test]
    fn test_all_runs_length_one() {
        // All 256 byte values ascending, then the same block reversed. The
        // two central 0xFF bytes merge into one run of length two, so the
        // text has 511 runs, not 512.
        let mut text: Vec<u8> = (0..=255u8).collect();
        text.extend((0..=255u8).rev());
        let wt = RlWaveletTree::from_bytes(&text).unwrap();
        assert_eq!(wt.len(), 512);
        assert_eq!(wt.sigma(), 256);
        assert_eq!(wt.num_runs(), 511);
        check_against_naive(&wt, &text);
    }

    #[test]
    fn test_run_mark_counts() {
        for text in [&b"abracadabra"[..], &b"aaaabbbccd"[..], &[7u8; 333][..]] {
            let wt = RlWaveletTree::from_bytes(text).unwrap();
            let x = wt.inner.as_ref().unwrap();
            let runs = naive_runs(text);
            assert_eq!(x.bl.num_ones(), runs);
            assert_eq!(x.bf.num_ones(), runs + 1);
            assert!(x.bf.access(text.len()).unwrap());
            assert_eq!(x.wt().len(), runs);
        }
    }

    fn gen_run_text(len: usize, sigma: u8, seed: u64) -> Vec<u8> {
        let mut rng = ChaChaRng::seed_from_u64(seed);
        let mut text = Vec::with_capacity(len);
        while text.len() < len {
            let b = rng.gen_range(0..sigma);
            let run = rng.gen_range(1..8).min(len - text.len());
            text.extend(std::iter::repeat(b).take(run));
        }
        text
    }

    #[test]
    fn test_random_small() {
        for (len, seed) in [(1, 0), (2, 1), (3, 2), (10, 3), (100, 4), (1000, 5)] {
            let text = gen_run_text(len, 4, seed);
            let wt = RlWaveletTree::from_bytes(&text).unwrap();
            check_against_naive(&wt, &text);
        }
    }

    #[test]
    fn test_random_full_alphabet() {
        let mut rng = ChaChaRng::seed_from_u64(42);
        let text: Vec<u8> = (0..5000).map(|_| rng.gen()).collect();
        let wt = RlWaveletTree::from_bytes(&text).unwrap();
        check_against_naive(&wt, &text);
    }

    #[test]
    fn test_random_sweep() {
        let text = gen_run_text(100_000, 8, 99);
        let wt = RlWaveletTree::from_bytes(&text).unwrap();
        assert_eq!(wt.len(), text.len());
        assert_eq!(wt.num_runs(), naive_runs(&text));

        let mut counts = vec![0usize; 256];
        for (i, &b) in text.iter().enumerate() {
            if i % 31 == 0 {
                assert_eq!(wt.access(i).unwrap(), b);
                assert_eq!(wt.inverse_select(i).unwrap(), (counts[b as usize], b));
                assert_eq!(wt.rank(i, b).unwrap(), counts[b as usize]);
                // Round trip: the (rank + 1)-th occurrence is this position.
                assert_eq!(wt.select(counts[b as usize] + 1, b).unwrap(), i);
            }
            counts[b as usize] += 1;
        }
        for b in 0..8u8 {
            assert_eq!(wt.rank(text.len(), b).unwrap(), counts[b as usize]);
        }
    }

    #[test]
    fn test_plain_and_sparse_flavors_agree() {
        let text = gen_run_text(3000, 5, 7);
        let mut src = SliceSource::new(&text);
        let sparse = RlWaveletTree::from_source(&mut src).unwrap();
        let plain = RlWaveletTree::from_source_with(
            &mut src,
            RsVectorKind::Plain,
            RsVectorKind::Plain,
            None,
        )
        .unwrap();
        for i in 0..text.len() {
            assert_eq!(plain.access(i).unwrap(), sparse.access(i).unwrap());
        }
        for b in 0..5u8 {
            for i in (0..=text.len()).step_by(13) {
                assert_eq!(plain.rank(i, b).unwrap(), sparse.rank(i, b).unwrap());
            }
        }
    }

    #[test]
    fn test_read_source() {
        let text = gen_run_text(70_000, 3, 8); // spans multiple blocks
        let mut src = ReadSource::new(std::io::Cursor::new(text.clone()));
        let wt = RlWaveletTree::from_source(&mut src).unwrap();
        let other = RlWaveletTree::from_bytes(&text).unwrap();
        assert_eq!(wt, other);
    }

    #[test]
    fn test_cancel() {
        let text = gen_run_text(1000, 3, 9);
        let cancel = AtomicBool::new(true);
        let mut src = SliceSource::new(&text);
        let e = RlWaveletTree::from_source_with(
            &mut src,
            RsVectorKind::Sparse,
            RsVectorKind::Sparse,
            Some(&cancel),
        );
        assert!(matches!(e, Err(Error::Cancelled)));
    }

    #[test]
    fn test_swap() {
        let mut a = RlWaveletTree::from_bytes(b"abracadabra").unwrap();
        let mut b = RlWaveletTree::from_bytes(b"mississippi").unwrap();
        a.swap(&mut b);
        assert_eq!(a.access(0).unwrap(), b'm');
        assert_eq!(b.access(0).unwrap(), b'a');
        assert_eq!(a.rank(11, b's').unwrap(), 4);
        assert_eq!(b.rank(11, b'a').unwrap(), 5);
        check_against_naive(&a, b"mississippi");
        check_against_naive(&b, b"abracadabra");
    }

    #[test]
    fn test_serialize() {
        for text in [&b""[..], &b"aaaa"[..], &b"abracadabra"[..]] {
            let wt = RlWaveletTree::from_bytes(text).unwrap();
            let mut bytes = vec![];
            let size = wt.serialize_into(&mut bytes).unwrap();
            let other = RlWaveletTree::deserialize_from(&bytes[..]).unwrap();
            assert_eq!(wt, other);
            assert_eq!(size, bytes.len());
            assert_eq!(size, wt.size_in_bytes());
            if !text.is_empty() {
                check_against_naive(&other, text);
            }
        }
    }

    #[test]
    fn test_serialize_mixed_kinds() {
        let text = gen_run_text(2000, 4, 10);
        let mut src = SliceSource::new(&text);
        let wt = RlWaveletTree::from_source_with(
            &mut src,
            RsVectorKind::Plain,
            RsVectorKind::Sparse,
            None,
        )
        .unwrap();
        let mut bytes = vec![];
        wt.serialize_into(&mut bytes).unwrap();
        let other = RlWaveletTree::deserialize_from(&bytes[..]).unwrap();
        assert_eq!(wt, other);
        check_against_naive(&other, &text);
    }

    #[test]
    fn test_deserialize_bad_magic() {
        let wt = RlWaveletTree::from_bytes(b"abracadabra").unwrap();
        let mut bytes = vec![];
        wt.serialize_into(&mut bytes).unwrap();
        bytes[0] = b'X';
        let e = RlWaveletTree::deserialize_from(&bytes[..]);
        let err = e.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn test_deserialize_truncated() {
        let wt = RlWaveletTree::from_bytes(b"abracadabra").unwrap();
        let mut bytes = vec![];
        wt.serialize_into(&mut bytes).unwrap();
        bytes.truncate(bytes.len() / 2);
        assert!(RlWaveletTree::deserialize_from(&bytes[..]).is_err());
    }
}
