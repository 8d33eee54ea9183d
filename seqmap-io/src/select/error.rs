//! Error types for source selection

use seqmap_core::SeqError;
use thiserror::Error;

/// Failures while loading a document or narrowing it to a pipeline source
#[derive(Debug, Error)]
pub enum SourceError {
    /// Document is larger than `max_buffer_bytes`
    #[error(
        "document too large: stopped after {buffered_bytes} bytes (max_buffer_bytes = {limit_bytes}); \
         raise limits.max_buffer_bytes to at least {suggested_size}"
    )]
    BufferLimitExceeded {
        /// Configured limit in bytes
        limit_bytes: usize,
        /// Bytes consumed before reading stopped
        buffered_bytes: usize,
        /// Human-readable size with headroom
        suggested_size: String,
    },

    /// Pointer has more tokens than `max_depth`
    #[error(
        "pointer '{pointer}' has {depth} segments (max_depth = {max_depth}); \
         raise limits.max_pointer_depth or select a shallower sequence"
    )]
    DepthLimitExceeded {
        /// Offending pointer
        pointer: String,
        /// Number of segments
        depth: usize,
        /// Configured limit
        max_depth: usize,
    },

    /// Pointer string is longer than `max_pointer_length`
    #[error("pointer is {length} characters long (max_pointer_length = {max_length})")]
    PointerTooLong {
        /// Offending pointer
        pointer: String,
        /// Pointer length in characters
        length: usize,
        /// Configured limit
        max_length: usize,
    },

    /// A pointer segment names nothing in the document
    #[error("no value at '{pointer}': resolved up to '{reached_path}', keys there: {available_keys}")]
    PointerNotFound {
        /// Pointer being resolved
        pointer: String,
        /// Prefix that did resolve
        reached_path: String,
        /// Keys present where resolution stopped
        available_keys: String,
    },

    /// Pointer resolves to something that cannot feed a pipeline
    #[error("'{pointer}' selects a {found_type}, not a sequence")]
    PointerTargetWrongType {
        /// Pointer being resolved
        pointer: String,
        /// Kind of the selected value
        found_type: String,
    },

    /// Pointer is not valid RFC 6901 syntax
    #[error("invalid JSON Pointer '{pointer}': {reason} (pointers start with '/', '~0' escapes '~', '~1' escapes '/')")]
    InvalidPointer {
        /// Offending pointer
        pointer: String,
        /// What is wrong with it
        reason: String,
    },

    /// Requested limits are above the hard maximums
    #[error(
        "{reason} (hard maximums: max_depth {max_depth}, max_buffer_bytes {max_buffer}, \
         max_pointer_length {max_ptr_len})"
    )]
    ConfigurationExceedsHardLimits {
        /// Which limit was exceeded
        reason: String,
        /// Hard maximum pointer depth
        max_depth: usize,
        /// Hard maximum document size in bytes
        max_buffer: usize,
        /// Hard maximum pointer length
        max_ptr_len: usize,
    },

    /// Document is not valid JSON
    #[error("{context}: {source}")]
    JsonParse {
        /// What was being parsed
        context: String,
        /// Underlying parser error
        source: serde_json::Error,
    },

    /// Reading the document failed
    #[error("reading document: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the pipeline itself
    #[error(transparent)]
    Seq(#[from] SeqError),
}

impl SourceError {
    /// Size to suggest after reading `current_bytes`, with 50% headroom
    pub fn suggest_buffer_size(current_bytes: usize) -> String {
        format_bytes(current_bytes.saturating_add(current_bytes / 2))
    }
}

/// Byte count in decimal units (`512`, `1.5K`, `16.0M`)
fn format_bytes(bytes: usize) -> String {
    const UNITS: [(f64, &str); 3] = [(1e9, "G"), (1e6, "M"), (1e3, "K")];

    let b = bytes as f64;
    UNITS
        .iter()
        .find(|(scale, _)| b >= *scale)
        .map(|(scale, unit)| format!("{:.1}{}", b / scale, unit))
        .unwrap_or_else(|| bytes.to_string())
}
