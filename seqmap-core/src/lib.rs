//! seqmap Core - Primitives for lazy sequence transformation
//!
//! This crate provides the data model shared by the seqmap engine with no
//! pipeline logic of its own. It includes:
//!
//! - Keys, values and the insertion-ordered associative sequence (`Assoc`)
//! - Sentinels and the transform step sum type
//! - The mapped-value override carrier
//! - Source resolution and the cursor adapter with one-step lookahead
//! - Error types
//! - Depth limits
//! - JSON conversion

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod assoc;
pub mod constants;
pub mod cursor;
pub mod error;
pub mod json;
pub mod key;
pub mod limits;
pub mod mapped;
pub mod sentinel;
pub mod source;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use assoc::Assoc;
pub use cursor::{Cursor, Entries, SeqCursor, SourceCursor};
pub use error::{Result, SeqError};
pub use key::Key;
pub use limits::Limits;
pub use mapped::{GroupPath, MappedValue};
pub use sentinel::{Sentinel, Step};
pub use source::Source;
pub use types::ValueKind;
pub use value::{Object, Value};

/// Build an [`Assoc`] from `key => value` pairs.
///
/// ```
/// use seqmap_core::assoc;
///
/// let row = assoc! { "name" => "alice", 3 => 1.5 };
/// assert_eq!(row.len(), 2);
/// ```
#[macro_export]
macro_rules! assoc {
    () => {
        $crate::Assoc::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut assoc = $crate::Assoc::new();
        $(
            assoc.insert($crate::Key::from($key), $crate::Value::from($value));
        )+
        assoc
    }};
}
