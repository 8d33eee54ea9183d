//! Element values

use crate::assoc::Assoc;
use crate::error::{Result, SeqError};
use crate::source::Source;
use crate::types::ValueKind;
use std::fmt;
use std::rc::Rc;

/// Opaque object carried as a value
///
/// Objects take part in the pipeline through three optional capabilities:
/// named properties and zero-argument methods (used by sort column
/// extractors), and exposing a sequence of their own (wrapper objects that
/// the cursor adapter unwraps).
pub trait Object: fmt::Debug {
    /// Type name used in error messages and string conversion
    fn type_name(&self) -> &str;

    /// Read a named property
    fn property(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Invoke a zero-argument method. `None` when no such method exists.
    fn call(&self, _method: &str) -> Option<Result<Value>> {
        None
    }

    /// Whether [`Object::sequence`] yields a source
    fn is_iterable(&self) -> bool {
        false
    }

    /// The sequence this object wraps
    fn sequence(&self) -> Result<Source> {
        Err(SeqError::NotIterable {
            found: self.type_name().to_string(),
        })
    }
}

/// Tagged element value
#[derive(Debug, Clone)]
pub enum Value {
    /// Null
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// UTF-8 string
    Str(String),
    /// Nested associative sequence
    Seq(Rc<Assoc>),
    /// Opaque object
    Object(Rc<dyn Object>),
}

impl Value {
    /// Build a list-like sequence value with keys `0..n`
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Seq(Rc::new(Assoc::list(items)))
    }

    /// Wrap an object
    pub fn object(object: impl Object + 'static) -> Self {
        Value::Object(Rc::new(object))
    }

    /// Kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::String,
            Value::Seq(_) => ValueKind::Seq,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Type name for diagnostics; objects report their own type name
    pub fn type_name(&self) -> String {
        match self {
            Value::Object(object) => object.type_name().to_string(),
            other => other.kind().name().to_string(),
        }
    }

    /// Whether this is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value can serve as a nested sequence
    pub fn is_iterable(&self) -> bool {
        match self {
            Value::Seq(_) => true,
            Value::Object(object) => object.is_iterable(),
            _ => false,
        }
    }

    /// Borrow the nested sequence, if this is one
    pub fn as_seq(&self) -> Option<&Assoc> {
        match self {
            Value::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    /// Borrow the string payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric payload of ints and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String form used by string comparisons and key joining
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) => String::new(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            Value::Seq(_) => "Array".to_string(),
            Value::Object(object) => object.type_name().to_string(),
        }
    }

    /// Numeric form used by numeric comparisons. Strings contribute their
    /// leading number (or 0), sequences their length.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Int(n) => *n as f64,
            Value::Float(f) => *f,
            Value::Str(s) => leading_number(s),
            Value::Seq(seq) => seq.len() as f64,
            Value::Object(_) => 1.0,
        }
    }

    /// Parse a string that is entirely numeric (surrounding whitespace allowed)
    pub fn numeric_str(s: &str) -> Option<f64> {
        let trimmed = s.trim();
        let first = trimmed.chars().next()?;
        if !(first.is_ascii_digit() || matches!(first, '+' | '-' | '.')) {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
    }
}

/// Longest numeric prefix of `s`, or 0 when there is none
fn leading_number(s: &str) -> f64 {
    let trimmed = s.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return 0.0;
    }
    trimmed[..end].parse::<f64>().unwrap_or(0.0)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::Object(a), Value::Object(b)) => {
                std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<Assoc> for Value {
    fn from(value: Assoc) -> Self {
        Value::Seq(Rc::new(value))
    }
}

impl From<Rc<Assoc>> for Value {
    fn from(value: Rc<Assoc>) -> Self {
        Value::Seq(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::list(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_string_follows_scalar_casts() {
        assert_eq!(Value::Null.to_display_string(), "");
        assert_eq!(Value::Bool(true).to_display_string(), "1");
        assert_eq!(Value::Float(2.0).to_display_string(), "2");
        assert_eq!(Value::Float(2.5).to_display_string(), "2.5");
        assert_eq!(Value::list(["a"]).to_display_string(), "Array");
    }

    #[test]
    fn numeric_conversions() {
        assert_eq!(Value::from("12abc").to_number(), 12.0);
        assert_eq!(Value::from("-3.5kg").to_number(), -3.5);
        assert_eq!(Value::from("abc").to_number(), 0.0);
        assert_eq!(Value::numeric_str(" 42 "), Some(42.0));
        assert_eq!(Value::numeric_str("42a"), None);
        assert_eq!(Value::numeric_str("inf"), None);
    }

    #[test]
    fn sequences_compare_structurally() {
        assert_eq!(Value::list(["a", "b"]), Value::list(["a", "b"]));
        assert_ne!(Value::list(["a", "b"]), Value::list(["b", "a"]));
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[derive(Debug)]
    struct Opaque;

    impl Object for Opaque {
        fn type_name(&self) -> &str {
            "Opaque"
        }
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = Value::object(Opaque);
        let b = Value::object(Opaque);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert!(!a.is_iterable());
        assert_eq!(a.type_name(), "Opaque");
    }
}
