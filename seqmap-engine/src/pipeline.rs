//! Pipeline builder tying sources, chains and consumers together

use crate::chain::{Chain, Transform};
use crate::materialize::{collect, traverse};
use crate::node::MapNode;
use crate::sort::{sort, SortSpec};
use crate::walker::{WalkMode, Walker};
use seqmap_core::{Assoc, Cursor, Entries, Key, Limits, Result, Source, Step, Value};
use tracing::debug;

/// A source plus the transforms to apply to it
///
/// Pipelines are persistent: `then` and `map` return a new pipeline and
/// leave the receiver usable. Nothing runs until a consumer is called.
#[derive(Debug, Clone)]
pub struct Pipeline {
    source: Source,
    chain: Chain,
    limits: Limits,
}

impl Pipeline {
    /// Pipeline over `source` with no transforms
    pub fn new(source: impl Into<Source>) -> Self {
        Self {
            source: source.into(),
            chain: Chain::empty(),
            limits: Limits::default(),
        }
    }

    /// Replace the depth limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Replace the transform chain
    pub fn with_chain(mut self, chain: Chain) -> Self {
        self.chain = chain;
        self
    }

    /// Source this pipeline reads
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Transform chain applied to the first level
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Depth limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// New pipeline with `transform` appended
    pub fn then(&self, transform: Transform) -> Pipeline {
        Pipeline {
            source: self.source.clone(),
            chain: self.chain.then(transform),
            limits: self.limits.clone(),
        }
    }

    /// New pipeline with a value-only transform appended
    pub fn map<F, S>(&self, f: F) -> Pipeline
    where
        F: Fn(Value) -> S + 'static,
        S: Into<Step>,
    {
        self.then(Transform::map(f))
    }

    /// Lazy mapped node over the source
    pub fn node(&self) -> MapNode {
        MapNode::new(self.source.clone(), self.chain.clone(), self.limits.clone())
    }

    /// Depth-first walker over the mapped tree
    pub fn walk(&self, mode: WalkMode) -> Walker {
        Walker::new(self.node(), mode, self.limits.clone())
    }

    /// Source that re-runs this pipeline every time it is opened
    pub fn into_source(self) -> Source {
        Source::stream(move || {
            let node: Box<dyn Cursor> = Box::new(self.node());
            Ok(node)
        })
    }

    /// Materialize the mapped first level
    pub fn collect(&self) -> Result<Assoc> {
        collect(&mut self.node())
    }

    /// Materialize the mapped values, dropping keys
    pub fn collect_values(&self) -> Result<Vec<Value>> {
        let mut node = self.node();
        Entries::new(&mut node)
            .map(|entry| entry.map(|(_, value)| value))
            .collect()
    }

    /// Fold the source through the chain into a grouped result
    pub fn traverse(&self) -> Result<Assoc> {
        traverse(&self.source, &self.chain, &self.limits)
    }

    /// Materialize the mapped first level and sort it
    pub fn sort(&self, spec: &SortSpec) -> Result<Assoc> {
        let mapped = self.clone().into_source();
        sort(&mapped, spec, &self.limits)
    }

    /// Every node of the tree keyed by its joined key path
    ///
    /// Root-level elements keep their own key; deeper elements are keyed
    /// by their key path joined with `glue`. Inner nodes keep their
    /// sequence value.
    pub fn flatten(&self, glue: &str) -> Result<Assoc> {
        self.collect_paths(WalkMode::SelfFirst, glue)
    }

    /// Leaf values keyed by their joined key path
    pub fn leaves(&self, glue: &str) -> Result<Assoc> {
        self.collect_paths(WalkMode::LeavesOnly, glue)
    }

    fn collect_paths(&self, mode: WalkMode, glue: &str) -> Result<Assoc> {
        let mut walker = self.walk(mode);
        let mut result = Assoc::new();
        walker.rewind()?;
        while walker.valid()? {
            let key: Key = walker.path_key(glue)?;
            result.insert(key, walker.current()?);
            walker.next()?;
        }
        debug!(?mode, entries = result.len(), "collected key paths");
        Ok(result)
    }

    /// Render the tree as indented lines, one per node
    ///
    /// Each line is `<indent><branch><key>: <value>`; the branch marker is
    /// `└─ ` for the last element of its level and `├─ ` otherwise. Inner
    /// nodes render without a value.
    pub fn tree_lines(&self, unit: &str) -> Result<Vec<String>> {
        let mut walker = self.walk(WalkMode::SelfFirst);
        let mut lines = Vec::new();
        walker.rewind()?;
        while walker.valid()? {
            let branch = match walker.is_last()? {
                Some(true) => "└─ ",
                _ => "├─ ",
            };
            let key = walker.key()?;
            let text = if walker.has_children()? {
                format!("{branch}{key}")
            } else {
                format!("{branch}{key}: {}", walker.current()?.to_display_string())
            };
            lines.push(walker.indent(unit, &text));
            walker.next()?;
        }
        Ok(lines)
    }
}
