//! Top module for bit vectors with rank/select queries.
//!
//! # Introduction
//!
//! Let $`S \subseteq \{ 0,1,\dots,u-1 \}`$ be the set of positions at which
//! bits are set in a bit vector of length $`u`$.
//! The structures in this module support the following queries:
//!
//! - $`\textrm{Access}(i)`$ returns `true` if $`i \in S`$ (implemented by [`Access`]).
//! - $`\textrm{Rank}(i)`$ returns the cardinality of $`\{ x \in S \mid x < i \}`$ (implemented by [`Rank`]).
//! - $`\textrm{Select}(k)`$ returns the $`k`$-th smallest position in $`S`$ (implemented by [`Select`]).
//!
//! # Data structures
//!
//! | Implementation | [Access](Access) | [Rank](Rank) | [Select](Select) | Memory (bits) |
//! | --- | :-: | :-: | :-: | :-: |
//! | [`BitVector`] | $`O(1)`$ | $`O(u)`$ | $`O(u)`$ | $`u`$ |
//! | [`Rank9Sel`] | $`O(1)`$ | $`O(1)`$ | $`O(\lg u)`$ | $`u + o(u)`$ |
//! | [`DArray`] | $`O(1)`$ | -- | $`O(1)`$ | $`u + o(u)`$ |
//! | [`SArray`] | $`O(\lg n)`$ | $`O(\lg \frac{u}{n})`$ | $`O(1)`$ | $`n \lceil \lg \frac{u}{n} \rceil + 2n + o(n)`$ |
//!
//! [`BitVector`] is the plain updatable format the others are built from.
//! [`Rank9Sel`] indexes it with Vigna's rank9 and hinted selection.
//! [`DArray`] is the constant-time select directory of Okanohara and Sadakane,
//! used here for the high bits of Elias-Fano sequences.
//! [`SArray`] compresses very sparse sets (i.e., $`n \ll u`$) with the
//! Elias-Fano scheme, keeping constant-time select1.
//!
//! [`RsVector`] packages the plain ([`Rank9Sel`]) and sparse ([`SArray`])
//! flavors behind one tagged value so that enclosing structures can choose a
//! flavor per bit vector at construction time.
pub mod bit_vector;
pub mod darray;
pub mod prelude;
pub mod rank9sel;
pub mod rs_vector;
pub mod sarray;

pub use bit_vector::BitVector;
pub use darray::DArray;
pub use rank9sel::Rank9Sel;
pub use rs_vector::{RsVector, RsVectorKind};
pub use sarray::SArray;

use anyhow::Result;

/// Interface for building a bit vector with rank/select queries.
pub trait Build {
    /// Creates a new vector from input bit stream `bits`.
    ///
    /// A data structure may not support a part of rank/select queries in the
    /// default configuration. The last three flags allow to enable them if
    /// optionally supported.
    ///
    /// # Arguments
    ///
    /// - `bits`: Bit stream.
    /// - `with_rank`: Flag to enable rank1/0.
    /// - `with_select1`: Flag to enable select1.
    /// - `with_select0`: Flag to enable select0.
    ///
    /// # Errors
    ///
    /// An error is returned if specified queries are not supported.
    fn build_from_bits<I>(
        bits: I,
        with_rank: bool,
        with_select1: bool,
        with_select0: bool,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = bool>,
        Self: Sized;
}

/// Interface for reporting basic statistics in a bit vector.
pub trait NumBits {
    /// Returns the number of bits stored.
    fn num_bits(&self) -> usize;

    /// Returns the number of bits set.
    fn num_ones(&self) -> usize;

    /// Returns the number of bits unset.
    #[inline(always)]
    fn num_zeros(&self) -> usize {
        self.num_bits() - self.num_ones()
    }
}

/// Interface for accessing elements on bit arrays.
pub trait Access {
    /// Returns the `pos`-th bit, or [`None`] if out of bounds.
    fn access(&self, pos: usize) -> Option<bool>;
}

/// Interface for rank queries on bit vectors.
pub trait Rank {
    /// Returns the number of ones in the prefix of length `pos`,
    /// or [`None`] if `pos` exceeds the number of bits.
    fn rank1(&self, pos: usize) -> Option<usize>;

    /// Returns the number of zeros in the prefix of length `pos`,
    /// or [`None`] if `pos` exceeds the number of bits.
    fn rank0(&self, pos: usize) -> Option<usize>;
}

/// Interface for select queries on bit vectors.
pub trait Select {
    /// Returns the position of the `k`-th bit set (`k` is 0-indexed), or
    /// [`None`] if out of bounds.
    fn select1(&self, k: usize) -> Option<usize>;

    /// Returns the position of the `k`-th bit unset (`k` is 0-indexed), or
    /// [`None`] if out of bounds.
    fn select0(&self, k: usize) -> Option<usize>;
}
