//! Top module for monotone-increasing integer sequences.
//!
//! # Introduction
//!
//! *Monotone-increasing integer sequences* are a generalization of bit
//! vectors, a multiset variant of bit positions; more simply, a sorted array
//! of integers.
//!
//! Let $`X = (x_0, x_1, \dots, x_{n-1})`$ be a sequence of $`n`$ integers
//! such that $`0 \leq x_0`$, $`x_i \leq x_{i+1}`$, and $`x_{n-1} < u`$ for a
//! universe $`u`$. [`EliasFano`] stores such a sequence in
//! $`n \lceil \lg \frac{u}{n} \rceil + 2n + o(n)`$ bits while supporting
//!
//! - $`\textrm{Select}(k)`$, returning $`x_k`$, in constant time, and
//! - $`\textrm{Rank}(x)`$, returning the number of elements smaller than
//!   $`x`$, in $`O(\lg \frac{u}{n})`$ time.
//!
//! It is the backbone of the sparse bit-vector flavor
//! ([`SArray`](crate::bit_vectors::SArray)).
pub mod elias_fano;

pub use elias_fano::{EliasFano, EliasFanoBuilder};
