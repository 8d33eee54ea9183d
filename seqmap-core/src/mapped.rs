//! Mapped-value override carrier

use crate::error::Result;
use crate::key::Key;
use crate::source::Source;
use crate::value::Value;
use smallvec::SmallVec;

/// Ordered bucket identifiers; empty means "no grouping"
pub type GroupPath = SmallVec<[Key; 4]>;

/// Per-element override returned by a transform
///
/// Every field starts unset, which is different from null: a transform that
/// only overrides the key leaves the value as the previous stage produced it.
#[derive(Debug, Clone, Default)]
pub struct MappedValue {
    value: Option<Value>,
    key: Option<Key>,
    group: Option<GroupPath>,
    children: Option<Source>,
}

/// Owned fields of a [`MappedValue`]
#[derive(Debug, Default)]
pub struct MappedParts {
    /// Replacement value
    pub value: Option<Value>,
    /// Replacement key
    pub key: Option<Key>,
    /// Group path; empty when unset
    pub group: GroupPath,
    /// Recursive children override
    pub children: Option<Source>,
}

impl MappedValue {
    /// Override nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the value only
    pub fn value(value: impl Into<Value>) -> Self {
        Self::new().with_value(value)
    }

    /// Override the key only
    pub fn key(key: impl Into<Key>) -> Self {
        Self::new().with_key(key)
    }

    /// Place the element under the group path only
    pub fn group<I, K>(path: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Self::new().with_group(path)
    }

    /// Set the value override
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the key override
    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the group path
    pub fn with_group<I, K>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        self.group = Some(path.into_iter().map(Into::into).collect());
        self
    }

    /// Set the recursive children
    pub fn with_children(mut self, children: impl Into<Source>) -> Self {
        self.children = Some(children.into());
        self
    }

    /// Set the recursive children to a sequence computed on demand
    pub fn with_children_fn(self, children: impl Fn() -> Result<Source> + 'static) -> Self {
        self.with_children(Source::factory(children))
    }

    /// Value override, if set
    pub fn value_override(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Key override, if set
    pub fn key_override(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Group path; empty when unset
    pub fn group_path(&self) -> &[Key] {
        self.group.as_deref().unwrap_or(&[])
    }

    /// Whether a non-empty group path is set
    pub fn is_grouped(&self) -> bool {
        !self.group_path().is_empty()
    }

    /// Children override, if set
    pub fn children(&self) -> Option<&Source> {
        self.children.as_ref()
    }

    /// Split into owned fields
    pub fn into_parts(self) -> MappedParts {
        MappedParts {
            value: self.value,
            key: self.key,
            group: self.group.unwrap_or_default(),
            children: self.children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assoc::Assoc;

    #[test]
    fn fields_default_to_unset() {
        let mapped = MappedValue::new();
        assert!(mapped.value_override().is_none());
        assert!(mapped.key_override().is_none());
        assert!(!mapped.is_grouped());
        assert!(mapped.children().is_none());
    }

    #[test]
    fn explicit_null_value_is_set() {
        let mapped = MappedValue::value(Value::Null);
        assert_eq!(mapped.value_override(), Some(&Value::Null));
    }

    #[test]
    fn empty_string_bucket_is_a_group() {
        let mapped = MappedValue::group([""]);
        assert!(mapped.is_grouped());
        assert_eq!(mapped.group_path(), &[Key::from("")]);
        assert!(!MappedValue::group(Vec::<Key>::new()).is_grouped());
    }

    #[test]
    fn into_parts_moves_everything() {
        let parts = MappedValue::key("k")
            .with_value(3)
            .with_group(["g", "h"])
            .with_children(Assoc::list(["c"]))
            .into_parts();
        assert_eq!(parts.key, Some(Key::from("k")));
        assert_eq!(parts.value, Some(Value::Int(3)));
        assert_eq!(parts.group.len(), 2);
        assert!(parts.children.is_some());
    }
}
