//! Value kind enumeration

/// Kind of a [`crate::Value`], ordered by cross-kind comparison rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ValueKind {
    /// Null value
    Null = 0,
    /// Boolean value
    Bool = 1,
    /// Integer value
    Int = 2,
    /// Floating point value
    Float = 3,
    /// String value
    String = 4,
    /// Nested associative sequence
    Seq = 5,
    /// Opaque object
    Object = 6,
}

impl ValueKind {
    /// Human-readable name used in error messages
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Int => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Seq => "sequence",
            ValueKind::Object => "object",
        }
    }

    /// Whether values of this kind compare numerically
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Float)
    }
}
