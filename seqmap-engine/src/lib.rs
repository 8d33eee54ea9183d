//! seqmap Engine - Lazy mapping, walking, grouping and sorting
//!
//! This crate builds the sequence transformation machinery on top of
//! `seqmap-core`:
//!
//! - Transform chains and the per-element sentinel protocol
//! - The tree mapping node (lazy, idempotent, grouping drain)
//! - The depth-first path walker
//! - The grouping materializer
//! - The sort engine (flags, comparators, columns, nested levels)
//! - The pipeline builder tying them together

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod chain;
pub mod compare;
pub mod materialize;
pub mod node;
pub mod pipeline;
pub mod sort;
pub mod walker;

// Re-export commonly used types
pub use seqmap_core::{
    Assoc, Cursor, Key, Limits, MappedValue, Result, SeqError, Source, Step, Value,
};

// Re-export our own types
pub use chain::{Chain, Element, Outcome, Position, Transform};
pub use compare::{compare_values, natural_cmp, SortFlags, SortMode};
pub use materialize::{collect, place, traverse};
pub use node::MapNode;
pub use pipeline::Pipeline;
pub use sort::{sort, sort_assoc, sort_entries, sort_nested, CompareFn, Criterion, Extractor, SortSpec};
pub use walker::{WalkMode, Walker};
