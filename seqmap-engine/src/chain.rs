//! Transform chains

use seqmap_core::{
    GroupPath, Key, MappedValue, Result, Sentinel, Source, SourceCursor, Step, Value,
};
use std::fmt;
use std::rc::Rc;

/// Signature of a transform: `(value, key, position) -> step`
pub type TransformFn = dyn Fn(Value, &Key, &mut Position<'_>) -> Result<Step>;

/// View of the cursor a transform is being applied on
pub struct Position<'a> {
    cursor: &'a mut SourceCursor,
    depth: usize,
    ordinal: usize,
}

impl<'a> Position<'a> {
    pub(crate) fn new(cursor: &'a mut SourceCursor, depth: usize, ordinal: usize) -> Self {
        Self {
            cursor,
            depth,
            ordinal,
        }
    }

    /// Whether the element being transformed is the last one of its sequence
    pub fn is_last(&mut self) -> Result<Option<bool>> {
        self.cursor.is_last()
    }

    /// Nesting depth of the sequence (0 for the root)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of raw elements pulled before this one
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}

/// One transform in a chain
#[derive(Clone)]
pub struct Transform(Rc<TransformFn>);

impl Transform {
    /// Transform with access to the cursor position
    pub fn new(f: impl Fn(Value, &Key, &mut Position<'_>) -> Result<Step> + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Infallible transform of the value alone
    pub fn map<F, S>(f: F) -> Self
    where
        F: Fn(Value) -> S + 'static,
        S: Into<Step>,
    {
        Self::new(move |value, _, _| Ok(f(value).into()))
    }

    /// Infallible transform of value and key
    pub fn entry<F, S>(f: F) -> Self
    where
        F: Fn(Value, &Key) -> S + 'static,
        S: Into<Step>,
    {
        Self::new(move |value, key, _| Ok(f(value, key).into()))
    }

    /// Keep elements matching `predicate`, skip the rest
    pub fn filter(predicate: impl Fn(&Value, &Key) -> bool + 'static) -> Self {
        Self::new(move |value, key, _| {
            Ok(if predicate(&value, key) {
                Step::Value(value)
            } else {
                Step::skip()
            })
        })
    }

    /// Place every element under the bucket path computed from it
    pub fn group_by<F, I, K>(f: F) -> Self
    where
        F: Fn(&Value, &Key) -> I + 'static,
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Self::new(move |value, key, _| Ok(MappedValue::group(f(&value, key)).into()))
    }

    /// Apply to one element
    pub fn apply(&self, value: Value, key: &Key, position: &mut Position<'_>) -> Result<Step> {
        (self.0)(value, key, position)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

/// Element after a full pass through a chain
#[derive(Debug, Clone)]
pub struct Element {
    /// Final key
    pub key: Key,
    /// Final value
    pub value: Value,
    /// Group path; empty when the element is not grouped
    pub group: GroupPath,
    /// Children override
    pub children: Option<Source>,
}

/// Outcome of running one element through a chain
#[derive(Debug)]
pub enum Outcome {
    /// Element survives
    Emit(Element),
    /// Element is omitted
    Skip,
    /// Iteration ends before this element
    Stop,
}

/// Ordered, persistent list of transforms
///
/// Extending a chain produces a new chain; the original is untouched and
/// can still be used on its own.
#[derive(Clone, Debug)]
pub struct Chain {
    transforms: Rc<[Transform]>,
}

impl Default for Chain {
    fn default() -> Self {
        Self {
            transforms: Rc::from(Vec::new()),
        }
    }
}

impl Chain {
    /// Chain with no transforms
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of transforms
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether the chain has no transforms
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// New chain with `transform` appended
    pub fn then(&self, transform: Transform) -> Chain {
        let transforms: Vec<Transform> = self
            .transforms
            .iter()
            .cloned()
            .chain(std::iter::once(transform))
            .collect();
        Chain {
            transforms: transforms.into(),
        }
    }

    /// Run one element through every transform, left to right
    ///
    /// `Skip` and `Stop` short-circuit. An explicit null replaces the value
    /// with null and the chain continues. Mapped values override only the
    /// fields they set; a later group path replaces an earlier one.
    pub fn run(&self, value: Value, key: Key, position: &mut Position<'_>) -> Result<Outcome> {
        let mut element = Element {
            key,
            value,
            group: GroupPath::new(),
            children: None,
        };

        for transform in self.transforms.iter() {
            let step = transform.apply(element.value.clone(), &element.key, position)?;
            match step.sentinel() {
                Some(Sentinel::Skip) => return Ok(Outcome::Skip),
                Some(Sentinel::Stop) => return Ok(Outcome::Stop),
                Some(Sentinel::Null) => {
                    element.value = Value::Null;
                    continue;
                }
                None => {}
            }

            match step {
                Step::Value(value) => element.value = value,
                Step::Mapped(mapped) => {
                    let parts = mapped.into_parts();
                    if let Some(value) = parts.value {
                        element.value = value;
                    }
                    if let Some(key) = parts.key {
                        element.key = key;
                    }
                    if !parts.group.is_empty() {
                        element.group = parts.group;
                    }
                    if parts.children.is_some() {
                        element.children = parts.children;
                    }
                }
                Step::Signal(_) => {}
            }
        }

        Ok(Outcome::Emit(element))
    }
}

impl From<Transform> for Chain {
    fn from(transform: Transform) -> Self {
        Chain::empty().then(transform)
    }
}

impl From<Option<Transform>> for Chain {
    fn from(transform: Option<Transform>) -> Self {
        transform.map(Chain::from).unwrap_or_default()
    }
}

impl FromIterator<Transform> for Chain {
    fn from_iter<I: IntoIterator<Item = Transform>>(iter: I) -> Self {
        let transforms: Vec<Transform> = iter.into_iter().collect();
        Chain {
            transforms: transforms.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqmap_core::{Assoc, Cursor, Limits};

    fn run_on(chain: &Chain, value: Value) -> Outcome {
        let mut cursor = SourceCursor::new(Source::from(Assoc::list([value.clone()])), Limits::default());
        cursor.rewind().unwrap();
        let mut position = Position::new(&mut cursor, 0, 0);
        chain.run(value, Key::from(0), &mut position).unwrap()
    }

    #[test]
    fn transforms_apply_in_order() {
        let chain = Chain::empty()
            .then(Transform::map(|v: Value| Value::from(format!("{}1", v.to_display_string()))))
            .then(Transform::map(|v: Value| Value::from(format!("{}2", v.to_display_string()))));
        match run_on(&chain, Value::from("x")) {
            Outcome::Emit(element) => assert_eq!(element.value, Value::from("x12")),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn then_leaves_the_original_chain_alone() {
        let base = Chain::from(Transform::map(|v: Value| v));
        let extended = base.then(Transform::map(|_| Step::stop()));
        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
        assert!(matches!(run_on(&base, Value::from(1)), Outcome::Emit(_)));
        assert!(matches!(run_on(&extended, Value::from(1)), Outcome::Stop));
    }

    #[test]
    fn skip_short_circuits_later_transforms() {
        let chain = Chain::empty()
            .then(Transform::map(|_| Value::Null))
            .then(Transform::map(|_| -> Step { panic!("must not run") }));
        assert!(matches!(run_on(&chain, Value::from(1)), Outcome::Skip));
    }

    #[test]
    fn explicit_null_keeps_the_element() {
        let chain = Chain::from(Transform::map(|_| Step::null()));
        match run_on(&chain, Value::from(1)) {
            Outcome::Emit(element) => assert!(element.value.is_null()),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn key_override_keeps_prior_value() {
        let chain = Chain::empty()
            .then(Transform::map(|_| Value::from("v")))
            .then(Transform::map(|_| MappedValue::key("k")));
        match run_on(&chain, Value::from(1)) {
            Outcome::Emit(element) => {
                assert_eq!(element.key, Key::from("k"));
                assert_eq!(element.value, Value::from("v"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn empty_chain_passes_raw_nulls_through() {
        match run_on(&Chain::empty(), Value::Null) {
            Outcome::Emit(element) => assert!(element.value.is_null()),
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
