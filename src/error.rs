//! Error types surfaced by the query and construction interfaces.

use thiserror::Error;

/// Error variants reported by [`RlWaveletTree`](crate::char_sequences::RlWaveletTree).
#[derive(Debug, Error)]
pub enum Error {
    /// A query index or occurrence rank lies outside its legal domain.
    #[error("out of range: {0}")]
    OutOfRange(usize),

    /// A query was issued on a default-constructed, never-built structure.
    #[error("structure is uninitialized")]
    Uninitialized,

    /// Serialized data failed magic/version validation or violated an
    /// internal invariant at load time.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A cooperative cancellation was observed during construction.
    #[error("construction cancelled")]
    Cancelled,

    /// The underlying stream reported an error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for query and construction operations.
pub type Result<T> = std::result::Result<T, Error>;
