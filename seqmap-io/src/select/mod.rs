//! Loading JSON documents and selecting pipeline sources inside them
//!
//! A document is read through a byte-limited reader, converted into seqmap
//! values and then narrowed to the sequence a JSON Pointer names.

pub mod error;
pub mod pointer;

pub use error::SourceError;
pub use pointer::{escape_pointer_token, navigate_pointer, parse_pointer, unescape_pointer_token};

use seqmap_core::{Source, Value};
use std::io::{BufReader, Read};
use std::time::{Duration, Instant};
use tracing::debug;

/// Limits applied while loading documents and resolving pointers
#[derive(Debug, Clone)]
pub struct PointerLimits {
    /// Maximum pointer depth (number of tokens)
    pub max_depth: usize,
    /// Maximum bytes read from a document
    pub max_buffer_bytes: usize,
    /// Maximum pointer string length
    pub max_pointer_length: usize,
}

impl Default for PointerLimits {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_buffer_bytes: 16 * 1024 * 1024, // 16 MiB
            max_pointer_length: 256,
        }
    }
}

impl PointerLimits {
    /// Hard maximum limits that cannot be exceeded
    pub fn hard_maximums() -> Self {
        Self {
            max_depth: 32,
            max_buffer_bytes: 128 * 1024 * 1024, // 128 MiB
            max_pointer_length: 2048,
        }
    }

    /// Validate limits against hard maximums
    pub fn validate(&self) -> Result<(), SourceError> {
        let hard = Self::hard_maximums();
        let checks = [
            ("max_depth", self.max_depth, hard.max_depth),
            ("max_buffer_bytes", self.max_buffer_bytes, hard.max_buffer_bytes),
            ("max_pointer_length", self.max_pointer_length, hard.max_pointer_length),
        ];

        for (name, value, limit) in checks {
            if value > limit {
                return Err(SourceError::ConfigurationExceedsHardLimits {
                    reason: format!("{} {} exceeds hard limit {}", name, value, limit),
                    max_depth: hard.max_depth,
                    max_buffer: hard.max_buffer_bytes,
                    max_ptr_len: hard.max_pointer_length,
                });
            }
        }
        Ok(())
    }
}

/// Outcome of selecting a source from a document
#[derive(Debug, Clone)]
pub struct Selection {
    /// Pointer that was resolved
    pub pointer: String,
    /// Bytes read from the input
    pub bytes_read: usize,
    /// Number of elements at the selected sequence
    pub elements: usize,
    /// Time spent reading and navigating
    pub duration: Duration,
    /// The selected sequence
    pub source: Source,
}

/// Read a whole JSON document, bounded by `limits.max_buffer_bytes`
pub fn read_document<R: Read>(reader: R, limits: &PointerLimits) -> Result<Value, SourceError> {
    read_counted(reader, limits).map(|(value, _)| value)
}

fn read_counted<R: Read>(reader: R, limits: &PointerLimits) -> Result<(Value, usize), SourceError> {
    limits.validate()?;

    let mut limited = LimitedReader::new(BufReader::new(reader), limits.max_buffer_bytes);
    let parsed: Result<serde_json::Value, _> = serde_json::from_reader(&mut limited);

    // hitting the limit only matters when the input really continues past it
    if limited.overflowed()? {
        let buffered = limited.bytes_read();
        return Err(SourceError::BufferLimitExceeded {
            limit_bytes: limits.max_buffer_bytes,
            buffered_bytes: buffered,
            suggested_size: SourceError::suggest_buffer_size(buffered),
        });
    }
    let json = parsed.map_err(|e| SourceError::JsonParse {
        context: "parsing input document".to_string(),
        source: e,
    })?;

    Ok((Value::from(json), limited.bytes_read()))
}

/// Narrow `document` to the sequence at `pointer`
pub fn select(document: &Value, pointer: &str, limits: &PointerLimits) -> Result<Source, SourceError> {
    limits.validate()?;
    let tokens = parse_pointer(pointer, limits.max_pointer_length, limits.max_depth)?;
    let target = navigate_pointer(document, &tokens, pointer)?;

    if !target.is_iterable() {
        return Err(SourceError::PointerTargetWrongType {
            pointer: pointer.to_string(),
            found_type: target.kind().name().to_string(),
        });
    }
    Ok(Source::from_value(&target)?)
}

/// Read a document from `reader` and select the sequence at `pointer`
pub fn select_from_reader<R: Read>(
    reader: R,
    pointer: &str,
    limits: &PointerLimits,
) -> Result<Selection, SourceError> {
    let start = Instant::now();
    let (document, bytes_read) = read_counted(reader, limits)?;
    let source = select(&document, pointer, limits)?;

    let elements = match &source {
        Source::Seq(seq) => seq.len(),
        _ => 0,
    };
    let duration = start.elapsed();
    debug!(pointer, bytes_read, elements, ?duration, "selected source");

    Ok(Selection {
        pointer: pointer.to_string(),
        bytes_read,
        elements,
        duration,
        source,
    })
}

/// Reader wrapper that enforces a byte limit
struct LimitedReader<R> {
    inner: R,
    bytes_read: usize,
    limit: usize,
}

impl<R> LimitedReader<R> {
    fn new(inner: R, limit: usize) -> Self {
        Self {
            inner,
            bytes_read: 0,
            limit,
        }
    }

    fn bytes_read(&self) -> usize {
        self.bytes_read
    }
}

impl<R: Read> LimitedReader<R> {
    /// Whether the input holds more bytes than the limit allowed through
    fn overflowed(&mut self) -> std::io::Result<bool> {
        if self.bytes_read < self.limit {
            return Ok(false);
        }
        let mut extra = [0u8; 1];
        Ok(self.inner.read(&mut extra)? > 0)
    }
}

impl<R: Read> Read for LimitedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let remaining = self.limit.saturating_sub(self.bytes_read);
        if remaining == 0 {
            return Ok(0);
        }

        let take = buf.len().min(remaining);
        let n = self.inner.read(&mut buf[..take])?;
        self.bytes_read += n;
        Ok(n)
    }
}
