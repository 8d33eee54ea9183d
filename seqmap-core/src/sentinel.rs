//! Sentinels and transform steps
//!
//! A transform returns a [`Step`]: a plain value, a [`MappedValue`]
//! override, or one of the three [`Sentinel`]s. A plain `Value::Null`
//! (or `None`) means "skip"; a transform that wants to keep a null value
//! returns [`Sentinel::Null`].

use crate::mapped::MappedValue;
use crate::value::Value;

/// Control markers distinct from ordinary data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// Omit the element from all output
    Skip,
    /// Keep the element with a null value
    Null,
    /// Terminate iteration; the element and everything after it is dropped
    Stop,
}

/// Process-wide skip marker
pub const SKIP: Sentinel = Sentinel::Skip;
/// Process-wide explicit-null marker
pub const NULL: Sentinel = Sentinel::Null;
/// Process-wide stop marker
pub const STOP: Sentinel = Sentinel::Stop;

/// Result of one transform applied to one element
#[derive(Debug, Clone)]
pub enum Step {
    /// Replacement value
    Value(Value),
    /// Per-element override of value, key, group or children
    Mapped(MappedValue),
    /// Control marker
    Signal(Sentinel),
}

impl Step {
    /// Omit the element
    pub fn skip() -> Self {
        Step::Signal(SKIP)
    }

    /// Keep the element as null
    pub fn null() -> Self {
        Step::Signal(NULL)
    }

    /// Stop iterating
    pub fn stop() -> Self {
        Step::Signal(STOP)
    }

    /// The sentinel this step signals, if any. A bare null value counts as
    /// [`Sentinel::Skip`].
    pub fn sentinel(&self) -> Option<Sentinel> {
        match self {
            Step::Signal(sentinel) => Some(*sentinel),
            Step::Value(Value::Null) => Some(Sentinel::Skip),
            _ => None,
        }
    }
}

impl From<Value> for Step {
    fn from(value: Value) -> Self {
        Step::Value(value)
    }
}

impl From<Option<Value>> for Step {
    fn from(value: Option<Value>) -> Self {
        match value {
            Some(value) => Step::Value(value),
            None => Step::skip(),
        }
    }
}

impl From<Sentinel> for Step {
    fn from(sentinel: Sentinel) -> Self {
        Step::Signal(sentinel)
    }
}

impl From<MappedValue> for Step {
    fn from(mapped: MappedValue) -> Self {
        Step::Mapped(mapped)
    }
}

impl From<&str> for Step {
    fn from(value: &str) -> Self {
        Step::Value(Value::from(value))
    }
}

impl From<i64> for Step {
    fn from(value: i64) -> Self {
        Step::Value(Value::Int(value))
    }
}
