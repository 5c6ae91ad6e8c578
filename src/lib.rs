//! # `rlwt`: run-length wavelet tree and succinct companions
//!
//! This crate provides a run-length encoded wavelet tree over byte
//! sequences, together with the succinct building blocks it stands on. The
//! top-level structure,
//! [`RlWaveletTree`](char_sequences::RlWaveletTree), answers
//!
//! - $`\textrm{Access}(i)`$: the $`i`$-th byte of the indexed sequence,
//! - $`\textrm{Rank}(i, c)`$: occurrences of byte $`c`$ before position $`i`$, and
//! - $`\textrm{Select}(k, c)`$: the position of the $`k`$-th occurrence of $`c`$,
//!
//! in time depending on the alphabet rather than the sequence length, in
//! space driven by the number of equal-byte runs.
//!
//! # Modules
//!
//! - [`bit_vectors`]: Plain and compressed bit vectors with rank/select.
//! - [`mii_sequences`]: Monotone-increasing sequences (Elias-Fano).
//! - [`int_vectors`]: Compressed integer vectors.
//! - [`char_sequences`]: Character sequences, including the run-length
//!   wavelet tree.
//!
//! # Serialization
//!
//! All data structures implement the [`Serializable`] trait; the run-length
//! wavelet tree writes a self-describing little-endian layout with a magic
//! header validated at load time.
//!
//! # Limitation
//!
//! This library is designed to run on 64-bit machines.
#![warn(missing_docs)]

pub mod bit_vectors;
pub mod broadword;
pub mod char_sequences;
pub mod error;
pub mod int_vectors;
pub mod intrinsics;
pub mod mii_sequences;
pub mod serial;
pub mod utils;

pub use bit_vectors::{BitVector, Rank9Sel, RsVector, RsVectorKind, SArray};
pub use char_sequences::RlWaveletTree;
pub use error::{Error, Result};
pub use serial::Serializable;
