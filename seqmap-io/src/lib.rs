//! seqmap I/O - Entry points, document selection and lazy properties
//!
//! This crate provides the call surface collaborators use:
//!
//! - High-level entry points (`map`, `traverse`, `sort`, `flatten`, `tree`)
//! - Loading JSON documents and selecting sources by JSON Pointer
//! - Memoized named properties for object values

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod lazy_props;
pub mod select;

// Re-export commonly used types
pub use seqmap_core::{Assoc, Key, Limits, MappedValue, Result, SeqError, Source, Step, Value};
pub use seqmap_engine::{
    Chain, Criterion, Extractor, MapNode, Pipeline, SortFlags, SortSpec, Transform, WalkMode,
    Walker,
};

// Re-export our own types
pub use lazy_props::LazyProps;
pub use select::{read_document, select, select_from_reader, PointerLimits, Selection, SourceError};

/// Lazily mapped node over `source`
///
/// Transforms run left to right, once per element, the first time the node
/// is positioned on it.
pub fn map(source: impl Into<Source>, transforms: impl IntoIterator<Item = Transform>) -> MapNode {
    let chain: Chain = transforms.into_iter().collect();
    MapNode::new(source.into(), chain, Limits::default())
}

/// Fold `source` into one nested associative result
///
/// Without a transform this is a plain materialization.
pub fn traverse(source: impl Into<Source>, transform: Option<Transform>) -> Result<Assoc> {
    seqmap_engine::traverse(&source.into(), &Chain::from(transform), &Limits::default())
}

/// Materialize `source` and sort it
pub fn sort(source: impl Into<Source>, spec: impl Into<SortSpec>) -> Result<Assoc> {
    seqmap_engine::sort(&source.into(), &spec.into(), &Limits::default())
}

/// Materialize `source` and sort it level by level
pub fn sort_nested(source: impl Into<Source>, levels: &[SortSpec]) -> Result<Assoc> {
    seqmap_engine::sort_nested(&source.into(), levels, &Limits::default())
}

/// Every node of the tree keyed by its key path joined with `glue`
pub fn flatten(source: impl Into<Source>, transform: Option<Transform>, glue: &str) -> Result<Assoc> {
    pipeline(source, transform).flatten(glue)
}

/// Leaf values keyed by their key path joined with `glue`
pub fn leaves(source: impl Into<Source>, transform: Option<Transform>, glue: &str) -> Result<Assoc> {
    pipeline(source, transform).leaves(glue)
}

/// Pre-order walker over the tree of `source`
pub fn tree(source: impl Into<Source>, transform: Option<Transform>) -> Walker {
    pipeline(source, transform).walk(WalkMode::SelfFirst)
}

fn pipeline(source: impl Into<Source>, transform: Option<Transform>) -> Pipeline {
    Pipeline::new(source).with_chain(Chain::from(transform))
}
