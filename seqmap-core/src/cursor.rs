//! Pull-based cursors and the lookahead adapter

use crate::assoc::Assoc;
use crate::error::{Result, SeqError};
use crate::key::Key;
use crate::limits::Limits;
use crate::source::Source;
use crate::value::Value;
use std::rc::Rc;
use tracing::trace;

/// Stateful pull-based position over a sequence
pub trait Cursor {
    /// Move to the first element, restarting the underlying sequence
    fn rewind(&mut self) -> Result<()>;
    /// Whether the cursor is positioned on an element
    fn valid(&mut self) -> Result<bool>;
    /// Value at the current position
    fn current(&mut self) -> Result<Value>;
    /// Key at the current position
    fn key(&mut self) -> Result<Key>;
    /// Advance to the next element
    fn next(&mut self) -> Result<()>;
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    fn rewind(&mut self) -> Result<()> {
        (**self).rewind()
    }

    fn valid(&mut self) -> Result<bool> {
        (**self).valid()
    }

    fn current(&mut self) -> Result<Value> {
        (**self).current()
    }

    fn key(&mut self) -> Result<Key> {
        (**self).key()
    }

    fn next(&mut self) -> Result<()> {
        (**self).next()
    }
}

/// Cursor over a materialized [`Assoc`]
#[derive(Debug, Clone)]
pub struct SeqCursor {
    seq: Rc<Assoc>,
    pos: usize,
}

impl SeqCursor {
    /// Cursor positioned on the first element of `seq`
    pub fn new(seq: Rc<Assoc>) -> Self {
        Self { seq, pos: 0 }
    }
}

impl Cursor for SeqCursor {
    fn rewind(&mut self) -> Result<()> {
        self.pos = 0;
        Ok(())
    }

    fn valid(&mut self) -> Result<bool> {
        Ok(self.pos < self.seq.len())
    }

    fn current(&mut self) -> Result<Value> {
        self.seq.nth(self.pos).map(|(_, v)| v.clone())
    }

    fn key(&mut self) -> Result<Key> {
        self.seq.nth(self.pos).map(|(k, _)| k.clone())
    }

    fn next(&mut self) -> Result<()> {
        if self.pos < self.seq.len() {
            self.pos += 1;
        }
        Ok(())
    }
}

/// Element pulled ahead of the visible position by `is_last`
#[derive(Debug)]
struct Held {
    key: Key,
    value: Value,
    last: bool,
}

/// Adapter turning any [`Source`] into one cursor with lookahead
///
/// The source is resolved on every [`Cursor::rewind`], so factories are
/// re-invoked and yield a fresh sequence. [`SourceCursor::is_last`] pulls at
/// most one element ahead and serves the held element until the real
/// [`Cursor::next`].
pub struct SourceCursor {
    source: Source,
    limits: Limits,
    inner: Option<Box<dyn Cursor>>,
    held: Option<Held>,
}

impl SourceCursor {
    /// Adapter over `source`; nothing is resolved until the first rewind
    pub fn new(source: Source, limits: Limits) -> Self {
        Self {
            source,
            limits,
            inner: None,
            held: None,
        }
    }

    /// The source this cursor reads
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Whether the cursor has been rewound at least once
    pub fn is_positioned(&self) -> bool {
        self.inner.is_some()
    }

    /// Whether the current element is the last one
    ///
    /// `None` before the first rewind. At an exhausted position no element
    /// exists to be last, so the answer is `Some(false)`.
    pub fn is_last(&mut self) -> Result<Option<bool>> {
        if let Some(held) = &self.held {
            return Ok(Some(held.last));
        }
        let Some(inner) = self.inner.as_mut() else {
            return Ok(None);
        };
        if !inner.valid()? {
            return Ok(Some(false));
        }

        let key = inner.key()?;
        let value = inner.current()?;
        inner.next()?;
        let last = !inner.valid()?;
        trace!(%key, last, "pulled lookahead element");
        self.held = Some(Held { key, value, last });
        Ok(Some(last))
    }

    fn inner(&mut self) -> Result<&mut Box<dyn Cursor>> {
        self.inner
            .as_mut()
            .ok_or_else(|| SeqError::Internal("cursor used before rewind".to_string()))
    }
}

impl Cursor for SourceCursor {
    fn rewind(&mut self) -> Result<()> {
        self.held = None;
        let mut inner = self.source.open(&self.limits)?;
        inner.rewind()?;
        self.inner = Some(inner);
        Ok(())
    }

    fn valid(&mut self) -> Result<bool> {
        if self.held.is_some() {
            return Ok(true);
        }
        match self.inner.as_mut() {
            Some(inner) => inner.valid(),
            None => Ok(false),
        }
    }

    fn current(&mut self) -> Result<Value> {
        if let Some(held) = &self.held {
            return Ok(held.value.clone());
        }
        self.inner()?.current()
    }

    fn key(&mut self) -> Result<Key> {
        if let Some(held) = &self.held {
            return Ok(held.key.clone());
        }
        self.inner()?.key()
    }

    fn next(&mut self) -> Result<()> {
        if self.held.take().is_some() {
            // the inner cursor already sits on the following element
            return Ok(());
        }
        self.inner()?.next()
    }
}

/// Iterator over `(key, value)` pairs of a cursor, starting with a rewind
pub struct Entries<'a, C: Cursor + ?Sized> {
    cursor: &'a mut C,
    started: bool,
    failed: bool,
}

impl<'a, C: Cursor + ?Sized> Entries<'a, C> {
    /// Iterate `cursor` from the start
    pub fn new(cursor: &'a mut C) -> Self {
        Self {
            cursor,
            started: false,
            failed: false,
        }
    }

    fn pull(&mut self) -> Result<Option<(Key, Value)>> {
        if self.started {
            self.cursor.next()?;
        } else {
            self.cursor.rewind()?;
            self.started = true;
        }
        if !self.cursor.valid()? {
            return Ok(None);
        }
        Ok(Some((self.cursor.key()?, self.cursor.current()?)))
    }
}

impl<C: Cursor + ?Sized> Iterator for Entries<'_, C> {
    type Item = Result<(Key, Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.pull() {
            Ok(entry) => entry.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
