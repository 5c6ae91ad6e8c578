//! Top module for character sequences.
//!
//! # Introduction
//!
//! *Character sequences* generalize bit vectors to an alphabet
//! $`\Sigma = \{ 0,1,\dots,\sigma - 1 \}`$.
//!
//! Let $`(c_0, c_1, \dots, c_{n-1}) \in \Sigma^{n}`$ be a sequence of $`n`$
//! characters. The structures here support the following queries:
//!
//! - $`\textrm{Access}(i)`$ returns $`c_i`$.
//! - $`\textrm{Rank}(i,c)`$ returns the number of occurrences of character
//!   $`c`$ in $`c_0,c_1,\dots,c_{i-1}`$.
//! - $`\textrm{Select}(k,c)`$ returns the occurrence position of the
//!   $`k`$-th character $`c`$.
//!
//! # Data structures
//!
//! [`WaveletMatrix`] answers all three queries in $`O(\lg \sigma)`$ time over
//! a plain stored sequence.
//!
//! [`RlWaveletTree`] exploits runs of equal characters: it keeps only the
//! run heads in a [`WaveletMatrix`] and recovers positional information from
//! two sparse bit vectors aligned through the LF-mapping, following the
//! run-length encoded suffix-array index of Mäkinen and Navarro.
pub mod rl_wavelet_tree;
pub mod wavelet_matrix;

pub use rl_wavelet_tree::RlWaveletTree;
pub use wavelet_matrix::WaveletMatrix;
