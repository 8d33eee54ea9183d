//! Sequence sources and their resolution into cursors

use crate::assoc::Assoc;
use crate::cursor::{Cursor, SeqCursor};
use crate::error::{Result, SeqError};
use crate::limits::Limits;
use crate::value::{Object, Value};
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Zero-argument function producing a source; invoked again on every rewind
pub type Factory = Rc<dyn Fn() -> Result<Source>>;

/// Function opening a live cursor, used by pipelines acting as sources
pub type Opener = Rc<dyn Fn() -> Result<Box<dyn Cursor>>>;

/// Anything the cursor adapter can iterate
#[derive(Clone)]
pub enum Source {
    /// Materialized associative sequence
    Seq(Rc<Assoc>),
    /// Factory producing another source
    Factory(Factory),
    /// Wrapper object exposing a sequence
    Object(Rc<dyn Object>),
    /// Producer of live cursors
    Stream(Opener),
}

impl Source {
    /// Source backed by a factory
    pub fn factory(factory: impl Fn() -> Result<Source> + 'static) -> Self {
        Source::Factory(Rc::new(factory))
    }

    /// Source backed by a cursor opener
    pub fn stream(open: impl Fn() -> Result<Box<dyn Cursor>> + 'static) -> Self {
        Source::Stream(Rc::new(open))
    }

    /// Source over a nested value; fails with `NotIterable` for scalars
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Seq(seq) => Ok(Source::Seq(Rc::clone(seq))),
            Value::Object(object) if object.is_iterable() => Ok(Source::Object(Rc::clone(object))),
            other => Err(SeqError::NotIterable {
                found: other.type_name(),
            }),
        }
    }

    /// Resolve through factories and wrappers into a cursor
    ///
    /// Resolution is a bounded loop: more than `limits.max_unwrap_depth`
    /// unwrap steps fails with `TooDeep`, and a factory or wrapper that
    /// hands back itself fails with `SelfReferential`.
    pub fn open(&self, limits: &Limits) -> Result<Box<dyn Cursor>> {
        let mut current = self.clone();
        let mut depth = 0usize;

        loop {
            let next = match &current {
                Source::Seq(seq) => return Ok(Box::new(SeqCursor::new(Rc::clone(seq)))),
                Source::Stream(open) => return open(),
                Source::Factory(factory) => {
                    trace!(depth, "invoking source factory");
                    let produced = factory()?;
                    if let Source::Factory(inner) = &produced {
                        if std::ptr::addr_eq(Rc::as_ptr(inner), Rc::as_ptr(factory)) {
                            return Err(SeqError::SelfReferential {
                                type_name: "factory".to_string(),
                            });
                        }
                    }
                    produced
                }
                Source::Object(object) => {
                    if !object.is_iterable() {
                        return Err(SeqError::NotIterable {
                            found: object.type_name().to_string(),
                        });
                    }
                    trace!(depth, type_name = object.type_name(), "unwrapping wrapper object");
                    let produced = object.sequence()?;
                    if let Source::Object(inner) = &produced {
                        if std::ptr::addr_eq(Rc::as_ptr(inner), Rc::as_ptr(object)) {
                            return Err(SeqError::SelfReferential {
                                type_name: object.type_name().to_string(),
                            });
                        }
                    }
                    produced
                }
            };

            depth += 1;
            if depth > limits.max_unwrap_depth {
                return Err(SeqError::TooDeep {
                    what: "source unwrapping",
                    limit: limits.max_unwrap_depth,
                });
            }
            current = next;
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Seq(seq) => f.debug_tuple("Seq").field(seq).finish(),
            Source::Factory(_) => f.write_str("Factory(..)"),
            Source::Object(object) => f.debug_tuple("Object").field(object).finish(),
            Source::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Assoc> for Source {
    fn from(assoc: Assoc) -> Self {
        Source::Seq(Rc::new(assoc))
    }
}

impl From<Rc<Assoc>> for Source {
    fn from(assoc: Rc<Assoc>) -> Self {
        Source::Seq(assoc)
    }
}

impl From<Vec<Value>> for Source {
    fn from(values: Vec<Value>) -> Self {
        Source::from(Assoc::list(values))
    }
}
