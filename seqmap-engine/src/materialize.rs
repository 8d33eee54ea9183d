//! Grouping materializer

use crate::chain::{Chain, Outcome, Position};
use seqmap_core::{Assoc, Cursor, Key, Limits, Result, SeqError, Source, SourceCursor, Value};
use tracing::debug;

/// Assign `value` at `key` inside the nested buckets named by `group`
///
/// Buckets are created on first reference; a path segment that lands on a
/// non-sequence value replaces it with a fresh bucket. Existing keys are
/// overwritten in place.
pub fn place(
    target: &mut Assoc,
    group: &[Key],
    key: Key,
    value: Value,
    limits: &Limits,
) -> Result<()> {
    if group.len() > limits.max_group_depth {
        return Err(SeqError::TooDeep {
            what: "group path",
            limit: limits.max_group_depth,
        });
    }

    let mut bucket = target;
    for segment in group {
        bucket = bucket.bucket_mut(segment.clone());
    }
    bucket.insert(key, value);
    Ok(())
}

/// Fold `source` through `chain` into one nested associative result
///
/// Skipped elements are omitted, explicit nulls stored as null, and a stop
/// returns what was accumulated before the stopping element. The first
/// error aborts the whole fold.
pub fn traverse(source: &Source, chain: &Chain, limits: &Limits) -> Result<Assoc> {
    let mut cursor = SourceCursor::new(source.clone(), limits.clone());
    cursor.rewind()?;

    let mut result = Assoc::new();
    let mut ordinal = 0usize;
    while cursor.valid()? {
        let key = cursor.key()?;
        let value = cursor.current()?;
        let mut position = Position::new(&mut cursor, 0, ordinal);

        match chain.run(value, key, &mut position)? {
            Outcome::Emit(element) => {
                place(&mut result, &element.group, element.key, element.value, limits)?;
            }
            Outcome::Skip => {}
            Outcome::Stop => {
                debug!(ordinal, entries = result.len(), "traverse stopped");
                break;
            }
        }

        cursor.next()?;
        ordinal += 1;
    }

    Ok(result)
}

/// Materialize any cursor without transforming it
pub fn collect<C: Cursor + ?Sized>(cursor: &mut C) -> Result<Assoc> {
    seqmap_core::Entries::new(cursor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Transform;
    use seqmap_core::{assoc, MappedValue, Step};

    fn letters() -> Source {
        Source::from(Assoc::list(["a", "b", "c", "d", "e", "f"]))
    }

    #[test]
    fn plain_materialization_keeps_nulls() {
        let source = Source::from(Assoc::list([Value::Null, Value::from(1)]));
        let result = traverse(&source, &Chain::empty(), &Limits::default()).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.get(&Key::from(0)), Some(&Value::Null));
    }

    #[test]
    fn skip_null_and_stop_are_distinguishable() {
        let chain = Chain::from(Transform::map(|v: Value| match v.as_str() {
            Some("b") => Step::skip(),
            Some("c") => Step::null(),
            Some("e") => Step::stop(),
            _ => Step::Value(v),
        }));
        let result = traverse(&letters(), &chain, &Limits::default()).unwrap();
        assert_eq!(
            result,
            assoc! { 0 => "a", 2 => (), 3 => "d" }
        );
    }

    #[test]
    fn groups_nest_in_first_seen_order() {
        let source = Source::from(Assoc::list([1, 2, 3, 4, 5]));
        let chain = Chain::from(Transform::map(|v: Value| {
            let n = v.as_int().unwrap_or_default();
            let parity = if n % 2 == 0 { "even" } else { "odd" };
            let size = if n > 2 { "big" } else { "small" };
            MappedValue::group([parity, size]).with_key(n)
        }));
        let result = traverse(&source, &chain, &Limits::default()).unwrap();

        let expected = assoc! {
            "odd" => assoc! {
                "small" => assoc! { 1 => 1 },
                "big" => assoc! { 3 => 3, 5 => 5 },
            },
            "even" => assoc! {
                "small" => assoc! { 2 => 2 },
                "big" => assoc! { 4 => 4 },
            },
        };
        assert_eq!(result, expected);
    }

    #[test]
    fn group_by_empty_bucket() {
        let source = Source::from(Assoc::list(["a", "b"]));
        let chain = Chain::from(Transform::group_by(|_, _| [""]));
        let result = traverse(&source, &chain, &Limits::default()).unwrap();
        assert_eq!(result, assoc! { "" => Assoc::list(["a", "b"]) });
    }

    #[test]
    fn last_write_wins() {
        let source = Source::from(Assoc::list(["a", "b", "c"]));
        let chain = Chain::from(Transform::map(|v: Value| MappedValue::key("same").with_value(v)));
        let result = traverse(&source, &chain, &Limits::default()).unwrap();
        assert_eq!(result, assoc! { "same" => "c" });
    }

    #[test]
    fn errors_abort_the_fold() {
        let chain = Chain::from(Transform::new(|v, _, _| match v.as_str() {
            Some("c") => Err(SeqError::Transform("bad element".to_string())),
            _ => Ok(Step::Value(v)),
        }));
        assert!(matches!(
            traverse(&letters(), &chain, &Limits::default()),
            Err(SeqError::Transform(_))
        ));
    }

    #[test]
    fn group_depth_is_bounded() {
        let limits = Limits {
            max_group_depth: 2,
            ..Limits::default()
        };
        let mut target = Assoc::new();
        let path = [Key::from("a"), Key::from("b"), Key::from("c")];
        assert!(matches!(
            place(&mut target, &path, Key::from(0), Value::Null, &limits),
            Err(SeqError::TooDeep { .. })
        ));
    }
}
