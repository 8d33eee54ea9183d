//! Sort engine
//!
//! Sorting materializes a snapshot of its input and reorders the
//! `(key, value)` pairs; keys always stay attached to their values. All
//! passes use a stable sort, so equal elements keep their input order.

use crate::compare::{compare_values, SortFlags};
use crate::materialize::collect;
use seqmap_core::{Assoc, Key, Limits, Result, SeqError, Source, SourceCursor, Value};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Two-argument ordering function
pub type CompareFn = Rc<dyn Fn(&Value, &Value) -> Ordering>;

/// Custom extraction function for a sort column
pub type ExtractFn = Rc<dyn Fn(&Value, &Key) -> Result<Value>>;

/// What a sort column looks at
#[derive(Clone)]
pub enum Extractor {
    /// The element's key
    Key,
    /// The element's value
    Value,
    /// A member of the value (a key of a nested sequence or an object property)
    Member(Key),
    /// A zero-argument method of an object value
    Method(String),
    /// A custom function
    Func(ExtractFn),
}

impl Extractor {
    /// Extractor backed by a custom function
    pub fn func(f: impl Fn(&Value, &Key) -> Result<Value> + 'static) -> Self {
        Extractor::Func(Rc::new(f))
    }

    /// Pull the sort operand out of one element
    pub fn extract(&self, value: &Value, key: &Key) -> Result<Value> {
        match self {
            Extractor::Key => Ok(key.to_value()),
            Extractor::Value => Ok(value.clone()),
            Extractor::Member(member) => match value {
                Value::Seq(seq) => seq.get_required(member).cloned(),
                Value::Object(object) => {
                    let name = member.to_string();
                    object
                        .property(&name)
                        .ok_or(SeqError::UndefinedKey(member.clone()))
                }
                _ => Err(SeqError::UndefinedKey(member.clone())),
            },
            Extractor::Method(method) => match value {
                Value::Object(object) => object
                    .call(method)
                    .unwrap_or_else(|| Err(SeqError::UndefinedKey(Key::from(method.as_str())))),
                _ => Err(SeqError::UndefinedKey(Key::from(method.as_str()))),
            },
            Extractor::Func(f) => f(value, key),
        }
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extractor::Key => f.write_str("Key"),
            Extractor::Value => f.write_str("Value"),
            Extractor::Member(key) => f.debug_tuple("Member").field(key).finish(),
            Extractor::Method(name) => f.debug_tuple("Method").field(name).finish(),
            Extractor::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// One column of a multi-column sort
#[derive(Clone)]
pub struct Criterion {
    extractor: Extractor,
    descending: bool,
    flags: SortFlags,
    comparator: Option<CompareFn>,
}

impl Criterion {
    /// Ascending column over `extractor`, regular comparison
    pub fn new(extractor: Extractor) -> Self {
        Self {
            extractor,
            descending: false,
            flags: SortFlags::REGULAR,
            comparator: None,
        }
    }

    /// Ascending column over a member of each value
    pub fn member(key: impl Into<Key>) -> Self {
        Self::new(Extractor::Member(key.into()))
    }

    /// Ascending order
    pub fn asc(mut self) -> Self {
        self.descending = false;
        self
    }

    /// Descending order
    pub fn desc(mut self) -> Self {
        self.descending = true;
        self
    }

    /// Comparison flags for this column
    pub fn with_flags(mut self, flags: SortFlags) -> Self {
        self.descending = self.descending || flags.descending();
        self.flags = flags.comparison_only();
        self
    }

    /// Custom comparator for this column, replacing the flags
    pub fn with_comparator(mut self, compare: impl Fn(&Value, &Value) -> Ordering + 'static) -> Self {
        self.comparator = Some(Rc::new(compare));
        self
    }

    /// Whether the column sorts descending
    pub fn is_descending(&self) -> bool {
        self.descending
    }

    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        // descending swaps the operands instead of reversing the result
        let (a, b) = if self.descending { (b, a) } else { (a, b) };
        match &self.comparator {
            Some(compare) => compare(a, b),
            None => compare_values(a, b, self.flags),
        }
    }
}

impl fmt::Debug for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Criterion")
            .field("extractor", &self.extractor)
            .field("descending", &self.descending)
            .field("flags", &self.flags)
            .field("comparator", &self.comparator.as_ref().map(|_| ".."))
            .finish()
    }
}

/// How one level of elements is ordered
#[derive(Clone)]
pub enum SortSpec {
    /// Flag word: mode, case, by-key and direction bits
    Flags(SortFlags),
    /// Two-argument ordering function on keys or values
    Comparator {
        /// Ordering function
        compare: CompareFn,
        /// Apply to keys instead of values
        by_key: bool,
        /// Reverse by swapping arguments
        descending: bool,
    },
    /// Ordered columns; later columns break ties of earlier ones
    Columns(Vec<Criterion>),
}

impl SortSpec {
    /// Comparator-based spec over values
    pub fn comparator(compare: impl Fn(&Value, &Value) -> Ordering + 'static) -> Self {
        SortSpec::Comparator {
            compare: Rc::new(compare),
            by_key: false,
            descending: false,
        }
    }

    fn into_criteria(self) -> Vec<Criterion> {
        match self {
            SortSpec::Flags(flags) => {
                let extractor = if flags.by_key() {
                    Extractor::Key
                } else {
                    Extractor::Value
                };
                vec![Criterion::new(extractor).with_flags(flags)]
            }
            SortSpec::Comparator {
                compare,
                by_key,
                descending,
            } => vec![Criterion {
                extractor: if by_key { Extractor::Key } else { Extractor::Value },
                descending,
                flags: SortFlags::REGULAR,
                comparator: Some(compare),
            }],
            SortSpec::Columns(columns) => columns,
        }
    }
}

impl fmt::Debug for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortSpec::Flags(flags) => f.debug_tuple("Flags").field(flags).finish(),
            SortSpec::Comparator {
                by_key, descending, ..
            } => f
                .debug_struct("Comparator")
                .field("by_key", by_key)
                .field("descending", descending)
                .finish_non_exhaustive(),
            SortSpec::Columns(columns) => f.debug_tuple("Columns").field(columns).finish(),
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec::Flags(SortFlags::REGULAR)
    }
}

impl From<SortFlags> for SortSpec {
    fn from(flags: SortFlags) -> Self {
        SortSpec::Flags(flags)
    }
}

impl From<Vec<Criterion>> for SortSpec {
    fn from(columns: Vec<Criterion>) -> Self {
        SortSpec::Columns(columns)
    }
}

/// Stable sort of `(key, value)` pairs
///
/// Sort operands are extracted once per element before sorting; an
/// extraction failure aborts the sort.
pub fn sort_entries(entries: Vec<(Key, Value)>, spec: &SortSpec) -> Result<Vec<(Key, Value)>> {
    let criteria = spec.clone().into_criteria();
    if criteria.is_empty() || entries.len() < 2 {
        return Ok(entries);
    }

    let mut rows = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let operands = criteria
            .iter()
            .map(|criterion| criterion.extractor.extract(&value, &key))
            .collect::<Result<Vec<Value>>>()?;
        rows.push((operands, key, value));
    }

    rows.sort_by(|(a, ..), (b, ..)| {
        criteria
            .iter()
            .zip(a.iter().zip(b.iter()))
            .map(|(criterion, (a, b))| criterion.compare(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    debug!(
        elements = rows.len(),
        columns = criteria.len(),
        "sort pass finished"
    );
    Ok(rows.into_iter().map(|(_, key, value)| (key, value)).collect())
}

/// Sorted copy of `assoc`
pub fn sort_assoc(assoc: &Assoc, spec: &SortSpec) -> Result<Assoc> {
    let entries = assoc.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    Ok(sort_entries(entries, spec)?.into_iter().collect())
}

/// Materialize `source` and sort it
pub fn sort(source: &Source, spec: &SortSpec, limits: &Limits) -> Result<Assoc> {
    let mut cursor = SourceCursor::new(source.clone(), limits.clone());
    let snapshot = collect(&mut cursor)?;
    sort_assoc(&snapshot, spec)
}

/// Materialize `source` and sort it level by level
///
/// `levels[0]` orders the root, `levels[1]` every nested sequence directly
/// below it, and so on. Levels beyond the list are left in input order.
pub fn sort_nested(source: &Source, levels: &[SortSpec], limits: &Limits) -> Result<Assoc> {
    let mut cursor = SourceCursor::new(source.clone(), limits.clone());
    let snapshot = collect(&mut cursor)?;
    sort_level(&snapshot, levels, 0, limits)
}

fn sort_level(assoc: &Assoc, levels: &[SortSpec], depth: usize, limits: &Limits) -> Result<Assoc> {
    let Some((spec, rest)) = levels.split_first() else {
        return Ok(assoc.clone());
    };
    if depth >= limits.max_tree_depth {
        return Err(SeqError::TooDeep {
            what: "nested sort",
            limit: limits.max_tree_depth,
        });
    }

    let sorted = sort_assoc(assoc, spec)?;
    if rest.is_empty() {
        return Ok(sorted);
    }

    sorted
        .into_iter()
        .map(|(key, value)| {
            let value = match value.as_seq() {
                Some(inner) => Value::from(sort_level(inner, rest, depth + 1, limits)?),
                None => value,
            };
            Ok((key, value))
        })
        .collect()
}
