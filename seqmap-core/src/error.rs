//! Error types for seqmap

use crate::key::Key;
use thiserror::Error;

/// seqmap error types
#[derive(Debug, Error)]
pub enum SeqError {
    /// A value used as a sequence source is not iterable.
    #[error("Not iterable: expected a sequence source, found {found}")]
    NotIterable {
        /// Kind or type name of the offending value
        found: String,
    },
    /// A depth limit was exceeded while unwrapping sources or walking a tree.
    #[error("Too deep: {what} exceeded depth limit {limit}")]
    TooDeep {
        /// What was being resolved when the limit was hit
        what: &'static str,
        /// Configured limit
        limit: usize,
    },
    /// A wrapper object or factory returned itself as its own sequence.
    #[error("Self-referential source: {type_name} returned itself as its own sequence")]
    SelfReferential {
        /// Type name of the wrapper
        type_name: String,
    },
    /// Lookup by key against a sequence that does not contain it.
    #[error("Undefined key: {0}")]
    UndefinedKey(Key),
    /// Positional lookup outside the sequence bounds.
    #[error("Index out of range: {index} (length {len})")]
    OutOfRange {
        /// Requested position
        index: usize,
        /// Sequence length
        len: usize,
    },
    /// Write attempted through a property declared read-only.
    #[error("Read-only property: {0}")]
    ReadOnlyViolation(String),
    /// A user-supplied transform or accessor reported a failure.
    #[error("Transform failed: {0}")]
    Transform(String),
    /// A configured limit is invalid or was exceeded.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Internal invariant was violated.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SeqError>;
