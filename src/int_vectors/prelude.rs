//! The prelude for integer vectors.
//!
//! ```
//! # #![allow(unused_imports)]
//! use rlwt::int_vectors::prelude::*;
//! ```
pub use crate::int_vectors::IntGetter;
