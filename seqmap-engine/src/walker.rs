//! Depth-first path walker over tree nodes

use crate::node::MapNode;
use seqmap_core::{Cursor, Key, Limits, Result, SeqError, Value};
use smallvec::SmallVec;

/// Traversal order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkMode {
    /// Emit every node before its children (pre-order)
    #[default]
    SelfFirst,
    /// Emit only nodes without children
    LeavesOnly,
}

/// Iterative depth-first walker
///
/// Keeps one [`MapNode`] per depth level; the root sits at the bottom of
/// the stack and is never popped.
pub struct Walker {
    stack: Vec<MapNode>,
    mode: WalkMode,
    limits: Limits,
    started: bool,
}

impl Walker {
    /// Walker over `root`
    pub fn new(root: MapNode, mode: WalkMode, limits: Limits) -> Self {
        Self {
            stack: vec![root],
            mode,
            limits,
            started: false,
        }
    }

    /// Traversal order of this walker
    pub fn mode(&self) -> WalkMode {
        self.mode
    }

    /// Depth of the current position (0 for root-level elements)
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Keys from the root to the current element
    pub fn keys(&mut self) -> Result<SmallVec<[Key; 8]>> {
        self.ensure_started()?;
        self.stack.iter_mut().map(|node| node.key()).collect()
    }

    /// Current key path joined with `glue`; root-level keys stay as they are
    pub fn path_key(&mut self, glue: &str) -> Result<Key> {
        let keys = self.keys()?;
        if keys.len() == 1 {
            return Ok(keys[0].clone());
        }
        let joined: Vec<String> = keys.iter().map(Key::to_string).collect();
        Ok(Key::Str(joined.join(glue)))
    }

    /// Whether the current element is the last of its own level
    pub fn is_last(&mut self) -> Result<Option<bool>> {
        if !self.started {
            return Ok(None);
        }
        self.top().is_last()
    }

    /// Whether the current element has children
    pub fn has_children(&mut self) -> Result<bool> {
        self.ensure_started()?;
        self.top().has_children()
    }

    /// `text` prefixed with `unit` once per depth level
    pub fn indent(&self, unit: &str, text: &str) -> String {
        let mut out = unit.repeat(self.depth());
        out.push_str(text);
        out
    }

    fn top(&mut self) -> &mut MapNode {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn ensure_started(&mut self) -> Result<()> {
        if !self.started {
            self.rewind()?;
        }
        Ok(())
    }

    fn descend(&mut self) -> Result<()> {
        if self.stack.len() > self.limits.max_tree_depth {
            return Err(SeqError::TooDeep {
                what: "tree walk",
                limit: self.limits.max_tree_depth,
            });
        }
        let mut child = self.top().get_children()?;
        child.rewind()?;
        self.stack.push(child);
        Ok(())
    }

    /// Move from the current stack state to the next position to emit
    fn settle(&mut self) -> Result<()> {
        loop {
            if !self.top().valid()? {
                if self.stack.len() == 1 {
                    return Ok(());
                }
                self.stack.pop();
                // the parent was emitted (or skipped as an inner node) already
                self.top().next()?;
                continue;
            }

            match self.mode {
                WalkMode::SelfFirst => return Ok(()),
                WalkMode::LeavesOnly => {
                    if self.top().has_children()? {
                        self.descend()?;
                    } else {
                        return Ok(());
                    }
                }
            }
        }
    }
}

impl Cursor for Walker {
    fn rewind(&mut self) -> Result<()> {
        self.started = true;
        self.stack.truncate(1);
        self.stack[0].rewind()?;
        self.settle()
    }

    fn valid(&mut self) -> Result<bool> {
        self.ensure_started()?;
        self.top().valid()
    }

    fn current(&mut self) -> Result<Value> {
        self.ensure_started()?;
        self.top().current()
    }

    fn key(&mut self) -> Result<Key> {
        self.ensure_started()?;
        self.top().key()
    }

    fn next(&mut self) -> Result<()> {
        self.ensure_started()?;
        if !self.top().valid()? {
            return Ok(());
        }
        let descend = self.mode == WalkMode::SelfFirst && self.top().has_children()?;
        if descend {
            self.descend()?;
        } else {
            self.top().next()?;
        }
        self.settle()
    }
}
