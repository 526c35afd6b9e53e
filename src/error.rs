//! Error types for diff computation.

use thiserror::Error;

/// Errors that abort a diff. A partially written script is unusable after any of these.
///
/// Running past the cost cutoff is not an error: the cutoff itself is
/// returned as the distance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    /// Caller supplied an indexer without a comparator, or the reverse
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Scratch or output storage could not be allocated
    #[error("out of memory: failed to allocate {requested} slots")]
    OutOfMemory {
        /// Number of elements requested
        requested: usize,
    },

    /// Scratch index beyond the addressable range
    #[error("index {index} out of range (max {max})")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Largest addressable index
        max: usize,
    },

    /// Forward and reverse frontiers never met inside the layer bound
    #[error("no middle snake found for {left} x {right} subproblem")]
    AlgorithmFault {
        /// Length of the left range
        left: usize,
        /// Length of the right range
        right: usize,
    },

    /// A script does not tile the sequences it is applied to
    #[error("invalid script: {0}")]
    InvalidScript(String),
}

/// Result alias for diff operations.
pub type Result<T> = std::result::Result<T, DiffError>;

impl DiffError {
    pub(crate) fn invalid_script(msg: impl Into<String>) -> Self {
        Self::InvalidScript(msg.into())
    }
}
