//! Insertion-ordered associative sequence

use crate::error::{Result, SeqError};
use crate::key::Key;
use crate::value::Value;
use ahash::AHashMap;
use std::rc::Rc;

/// Insertion-ordered map from [`Key`] to [`Value`]
///
/// Assigning to an existing key overwrites the value in place, keeping the
/// original position. [`Assoc::push`] appends under the next integer key:
/// one past the largest integer key seen so far, or 0.
#[derive(Debug, Clone, Default)]
pub struct Assoc {
    entries: Vec<(Key, Value)>,
    index: AHashMap<Key, usize>,
    next_int: i64,
}

impl Assoc {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sequence with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: AHashMap::with_capacity(capacity),
            next_int: 0,
        }
    }

    /// Build a list with keys `0..n`
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let mut assoc = Self::new();
        for item in items {
            assoc.push(item.into());
        }
        assoc
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    /// Value stored under `key`
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    /// Mutable value stored under `key`
    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Value> {
        match self.index.get(key) {
            Some(&idx) => Some(&mut self.entries[idx].1),
            None => None,
        }
    }

    /// Value stored under `key`, failing with `UndefinedKey` when absent
    pub fn get_required(&self, key: &Key) -> Result<&Value> {
        self.get(key)
            .ok_or_else(|| SeqError::UndefinedKey(key.clone()))
    }

    /// Entry at insertion position `index`
    pub fn nth(&self, index: usize) -> Result<(&Key, &Value)> {
        self.entries
            .get(index)
            .map(|(k, v)| (k, v))
            .ok_or(SeqError::OutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Assign `value` at `key`, returning the previous value if the key existed
    pub fn insert(&mut self, key: Key, value: Value) -> Option<Value> {
        if let Some(&idx) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[idx].1, value));
        }

        if let Key::Int(n) = key {
            if n >= self.next_int {
                self.next_int = n.saturating_add(1);
            }
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Append `value` under the next integer key and return that key
    pub fn push(&mut self, value: Value) -> Key {
        let key = Key::Int(self.next_int);
        self.insert(key.clone(), value);
        key
    }

    /// Remove `key`, preserving the order of the remaining entries
    pub fn remove(&mut self, key: &Key) -> Option<Value> {
        let idx = self.index.remove(key)?;
        let (_, value) = self.entries.remove(idx);
        for (_, pos) in self.index.iter_mut() {
            if *pos > idx {
                *pos -= 1;
            }
        }
        Some(value)
    }

    /// Nested sequence stored at `key`, created empty when absent or when
    /// the slot holds a non-sequence value
    pub fn bucket_mut(&mut self, key: Key) -> &mut Assoc {
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                self.insert(key.clone(), Value::Seq(Rc::new(Assoc::new())));
                self.entries.len() - 1
            }
        };

        let slot = &mut self.entries[idx].1;
        if !matches!(slot, Value::Seq(_)) {
            *slot = Value::Seq(Rc::new(Assoc::new()));
        }
        match slot {
            Value::Seq(seq) => Rc::make_mut(seq),
            _ => unreachable!("slot was just replaced with a sequence"),
        }
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterate keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterate values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Whether the keys are exactly `0..len` in order
    pub fn is_list(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(idx, (key, _))| *key == Key::Int(idx as i64))
    }

    /// Drop the keys and re-index the values as `0..len`
    pub fn into_list(self) -> Assoc {
        Assoc::list(self.entries.into_iter().map(|(_, v)| v))
    }

    /// Consume into `(key, value)` pairs
    pub fn into_entries(self) -> Vec<(Key, Value)> {
        self.entries
    }
}

impl PartialEq for Assoc {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl FromIterator<(Key, Value)> for Assoc {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        let mut assoc = Assoc::new();
        for (key, value) in iter {
            assoc.insert(key, value);
        }
        assoc
    }
}

impl IntoIterator for Assoc {
    type Item = (Key, Value);
    type IntoIter = std::vec::IntoIter<(Key, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl From<Vec<Value>> for Assoc {
    fn from(values: Vec<Value>) -> Self {
        Assoc::list(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_overwrites_in_place() {
        let mut assoc = Assoc::new();
        assoc.insert(Key::from("a"), Value::from(1));
        assoc.insert(Key::from("b"), Value::from(2));
        let previous = assoc.insert(Key::from("a"), Value::from(3));

        assert_eq!(previous, Some(Value::from(1)));
        let entries: Vec<_> = assoc.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        assert_eq!(
            entries,
            vec![
                (Key::from("a"), Value::from(3)),
                (Key::from("b"), Value::from(2))
            ]
        );
    }

    #[test]
    fn push_uses_next_integer_key() {
        let mut assoc = Assoc::new();
        assoc.insert(Key::from(5), Value::from("x"));
        assoc.insert(Key::from("name"), Value::from("y"));
        assert_eq!(assoc.push(Value::from("z")), Key::from(6));
    }

    #[test]
    fn missing_lookups_are_typed_errors() {
        let assoc = Assoc::list(["a"]);
        assert!(matches!(
            assoc.get_required(&Key::from("nope")),
            Err(SeqError::UndefinedKey(_))
        ));
        assert!(matches!(
            assoc.nth(3),
            Err(SeqError::OutOfRange { index: 3, len: 1 })
        ));
    }

    #[test]
    fn remove_keeps_index_consistent() {
        let mut assoc = Assoc::list(["a", "b", "c"]);
        assert_eq!(assoc.remove(&Key::from(0)), Some(Value::from("a")));
        assert_eq!(assoc.get(&Key::from(2)), Some(&Value::from("c")));
        assert_eq!(assoc.nth(0).unwrap().1, &Value::from("b"));
    }

    #[test]
    fn bucket_mut_creates_and_replaces() {
        let mut assoc = Assoc::new();
        assoc.insert(Key::from("g"), Value::from(1));
        assoc.bucket_mut(Key::from("g")).push(Value::from("x"));
        assoc.bucket_mut(Key::from("h")).push(Value::from("y"));

        assert_eq!(assoc.get(&Key::from("g")), Some(&Value::list(["x"])));
        assert_eq!(assoc.get(&Key::from("h")), Some(&Value::list(["y"])));
    }

    #[test]
    fn list_detection() {
        assert!(Assoc::list(["a", "b"]).is_list());
        let mut assoc = Assoc::new();
        assoc.insert(Key::from(1), Value::Null);
        assert!(!assoc.is_list());
        assert!(assoc.into_list().is_list());
    }
}
