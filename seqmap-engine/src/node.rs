//! Tree mapping state machine
//!
//! A [`MapNode`] pulls elements from a [`SourceCursor`], runs each through a
//! [`Chain`] and exposes the surviving elements through the [`Cursor`]
//! primitives. Mapping is lazy: `next` only marks the position stale, and the
//! chain runs once per element the first time `valid`, `current` or `key`
//! needs it.
//!
//! # Grouping drain
//!
//! A grouped element (a mapped value with a non-empty group path) cannot be
//! emitted lazily, because later elements may land in the same bucket. The
//! node then drains every remaining element of its cursor through the chain,
//! materializes the grouped result and serves that result for the rest of
//! its life (until the next rewind). Children overrides of drained elements
//! that stay at the top level are kept in a side table; overrides of
//! elements placed inside a bucket are dropped, since the bucket value is
//! itself the recursive structure.

use crate::chain::{Chain, Element, Outcome, Position};
use crate::materialize::place;
use ahash::AHashMap;
use seqmap_core::{
    Assoc, Cursor, Key, Limits, Result, SeqError, Source, SourceCursor, Value,
};
use tracing::debug;

/// Current element of a node after mapping
#[derive(Debug, Clone)]
struct Mapped {
    key: Key,
    value: Value,
    children: Option<Source>,
}

/// Materialized grouped result served after a drain
struct Drained {
    cursor: SourceCursor,
    children: AHashMap<Key, Source>,
}

/// Lazily mapped, recursively expandable node
pub struct MapNode {
    cursor: SourceCursor,
    chain: Chain,
    limits: Limits,
    depth: usize,
    needs_rewind: bool,
    needs_next: bool,
    needs_map: bool,
    stopped: bool,
    pulled: usize,
    current: Option<Mapped>,
    drained: Option<Drained>,
}

impl MapNode {
    /// Node over `source` at the root level
    pub fn new(source: Source, chain: Chain, limits: Limits) -> Self {
        Self::at_depth(source, chain, limits, 0)
    }

    fn at_depth(source: Source, chain: Chain, limits: Limits, depth: usize) -> Self {
        Self {
            cursor: SourceCursor::new(source, limits.clone()),
            chain,
            limits,
            depth,
            needs_rewind: true,
            needs_next: false,
            needs_map: false,
            stopped: false,
            pulled: 0,
            current: None,
            drained: None,
        }
    }

    /// Nesting depth (0 for the root)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the node switched to a drained grouped result
    pub fn is_drained(&self) -> bool {
        self.drained.is_some()
    }

    /// Whether a transform stopped the node
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Whether the current element is the last one
    ///
    /// `None` before the first rewind. Delegates to the lookahead of the
    /// underlying cursor, so it reflects raw elements: a later element that
    /// the chain skips or stops on still counts.
    pub fn is_last(&mut self) -> Result<Option<bool>> {
        if self.needs_rewind {
            return Ok(None);
        }
        self.settle()?;
        if self.current.is_none() {
            return Ok(Some(false));
        }
        match self.drained.as_mut() {
            Some(drained) => drained.cursor.is_last(),
            None => self.cursor.is_last(),
        }
    }

    /// Whether the current element has recursive children
    pub fn has_children(&mut self) -> Result<bool> {
        self.settle()?;
        Ok(self
            .current
            .as_ref()
            .is_some_and(|c| c.children.is_some() || c.value.is_iterable()))
    }

    /// Node over the children of the current element
    ///
    /// Child nodes carry no transform chain: children overrides apply to
    /// the first level only, deeper levels expand purely by value nesting.
    pub fn get_children(&mut self) -> Result<MapNode> {
        self.settle()?;
        let current = self.current_ref()?;
        let source = match &current.children {
            Some(children) => children.clone(),
            None => Source::from_value(&current.value)?,
        };

        let depth = self.depth + 1;
        if depth > self.limits.max_tree_depth {
            return Err(SeqError::TooDeep {
                what: "tree expansion",
                limit: self.limits.max_tree_depth,
            });
        }
        Ok(MapNode::at_depth(source, Chain::empty(), self.limits.clone(), depth))
    }

    fn current_ref(&self) -> Result<&Mapped> {
        self.current.as_ref().ok_or(SeqError::OutOfRange {
            index: self.pulled,
            len: self.pulled,
        })
    }

    /// Bring the state flags up to date: rewind, advance, then map
    fn settle(&mut self) -> Result<()> {
        if self.needs_rewind {
            self.rewind()?;
        }
        if self.needs_next {
            self.needs_next = false;
            self.advance()?;
            self.needs_map = true;
        }
        if self.needs_map {
            self.needs_map = false;
            self.map_current()?;
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<()> {
        self.current = None;
        if self.stopped {
            return Ok(());
        }
        match self.drained.as_mut() {
            Some(drained) => drained.cursor.next(),
            None => {
                self.pulled += 1;
                self.cursor.next()
            }
        }
    }

    fn map_current(&mut self) -> Result<()> {
        self.current = None;
        if self.stopped {
            return Ok(());
        }

        if let Some(drained) = self.drained.as_mut() {
            if drained.cursor.valid()? {
                let key = drained.cursor.key()?;
                let value = drained.cursor.current()?;
                let children = drained.children.get(&key).cloned();
                self.current = Some(Mapped {
                    key,
                    value,
                    children,
                });
            }
            return Ok(());
        }

        while self.cursor.valid()? {
            match self.run_chain()? {
                Outcome::Emit(element) if element.group.is_empty() => {
                    self.current = Some(Mapped {
                        key: element.key,
                        value: element.value,
                        children: element.children,
                    });
                    return Ok(());
                }
                Outcome::Emit(element) => {
                    self.drain(element)?;
                    return self.map_current();
                }
                Outcome::Skip => {
                    self.pulled += 1;
                    self.cursor.next()?;
                }
                Outcome::Stop => {
                    debug!(depth = self.depth, pulled = self.pulled, "transform stopped node");
                    self.stopped = true;
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn run_chain(&mut self) -> Result<Outcome> {
        let key = self.cursor.key()?;
        let value = self.cursor.current()?;
        let mut position = Position::new(&mut self.cursor, self.depth, self.pulled);
        self.chain.run(value, key, &mut position)
    }

    /// Pull every remaining element through the chain into a grouped result
    fn drain(&mut self, first: Element) -> Result<()> {
        let mut result = Assoc::new();
        let mut children = AHashMap::new();
        let mut drained = 0usize;

        debug!(depth = self.depth, pulled = self.pulled, "grouped element, draining cursor");
        self.collect_into(&mut result, &mut children, first)?;

        loop {
            self.pulled += 1;
            self.cursor.next()?;
            if !self.cursor.valid()? {
                break;
            }
            match self.run_chain()? {
                Outcome::Emit(element) => {
                    self.collect_into(&mut result, &mut children, element)?;
                    drained += 1;
                }
                Outcome::Skip => {}
                Outcome::Stop => break,
            }
        }

        debug!(
            depth = self.depth,
            drained,
            entries = result.len(),
            "drained grouped elements"
        );
        let mut cursor = SourceCursor::new(Source::from(result), self.limits.clone());
        cursor.rewind()?;
        self.drained = Some(Drained { cursor, children });
        Ok(())
    }

    fn collect_into(
        &self,
        result: &mut Assoc,
        children: &mut AHashMap<Key, Source>,
        element: Element,
    ) -> Result<()> {
        match element.group.first() {
            Some(bucket) => {
                children.remove(bucket);
            }
            None => match element.children {
                Some(source) => {
                    children.insert(element.key.clone(), source);
                }
                None => {
                    children.remove(&element.key);
                }
            },
        }
        place(result, &element.group, element.key, element.value, &self.limits)
    }
}

impl Cursor for MapNode {
    fn rewind(&mut self) -> Result<()> {
        self.needs_rewind = false;
        self.needs_next = false;
        self.stopped = false;
        self.drained = None;
        self.current = None;
        self.pulled = 0;
        self.cursor.rewind()?;
        self.needs_map = true;
        Ok(())
    }

    fn valid(&mut self) -> Result<bool> {
        self.settle()?;
        Ok(self.current.is_some())
    }

    fn current(&mut self) -> Result<Value> {
        self.settle()?;
        Ok(self.current_ref()?.value.clone())
    }

    fn key(&mut self) -> Result<Key> {
        self.settle()?;
        Ok(self.current_ref()?.key.clone())
    }

    fn next(&mut self) -> Result<()> {
        self.settle()?;
        self.needs_next = true;
        self.current = None;
        Ok(())
    }
}
