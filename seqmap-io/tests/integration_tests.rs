//! End-to-end tests: documents on disk through selection and the entry points

use seqmap_io::{
    flatten, leaves, map, read_document, select, select_from_reader, sort, sort_nested, traverse,
    tree, Assoc, Criterion, Key, LazyProps, MappedValue, PointerLimits, SortFlags, SortSpec,
    Source, SourceError, Step, Transform, Value,
};
use seqmap_core::{assoc, Cursor, Entries};
use serde_json::json;
use std::fs::File;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_document(doc: serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    serde_json::to_writer(&mut file, &doc).expect("write document");
    file.flush().expect("flush");
    file
}

fn orders() -> serde_json::Value {
    json!({
        "meta": {"version": 2},
        "orders": [
            {"id": "o-10", "customer": "ann", "total": 30},
            {"id": "o-2", "customer": "bob", "total": 12},
            {"id": "o-7", "customer": "ann", "total": 12},
        ]
    })
}

#[test]
fn test_select_from_file_and_group() {
    let file = write_document(orders());
    let selection = select_from_reader(
        File::open(file.path()).unwrap(),
        "/orders",
        &PointerLimits::default(),
    )
    .unwrap();
    assert_eq!(selection.elements, 3);

    let by_customer = traverse(
        selection.source,
        Some(Transform::group_by(|order: &Value, _| {
            order
                .as_seq()
                .and_then(|o| o.get(&Key::from("customer")))
                .map(Value::to_display_string)
        })),
    )
    .unwrap();

    let keys: Vec<Key> = by_customer.keys().cloned().collect();
    assert_eq!(keys, vec![Key::from("ann"), Key::from("bob")]);
    let ann = by_customer.get(&Key::from("ann")).and_then(Value::as_seq).unwrap();
    assert_eq!(ann.len(), 2);
}

#[test]
fn test_sort_orders_by_total_then_natural_id() {
    let document = read_document(orders().to_string().as_bytes(), &PointerLimits::default()).unwrap();
    let source = select(&document, "/orders", &PointerLimits::default()).unwrap();

    let spec = SortSpec::Columns(vec![
        Criterion::member("total").desc(),
        Criterion::member("id").with_flags(SortFlags::NATURAL),
    ]);
    let sorted = sort(source, spec).unwrap();
    let ids: Vec<String> = sorted
        .values()
        .filter_map(|o| o.as_seq()?.get(&Key::from("id")).map(Value::to_display_string))
        .collect();
    assert_eq!(ids, vec!["o-10", "o-2", "o-7"]);
}

#[test]
fn test_map_entry_point_chains_transforms() {
    let mut node = map(
        Assoc::list([1, 2, 3, 4]),
        [
            Transform::filter(|v, _| v.as_int().is_some_and(|n| n % 2 == 0)),
            Transform::map(|v: Value| MappedValue::key(format!("n{}", v.to_display_string())).with_value(v)),
        ],
    );
    let entries: Vec<(Key, Value)> = Entries::new(&mut node).collect::<seqmap_io::Result<_>>().unwrap();
    assert_eq!(
        entries,
        vec![
            (Key::from("n2"), Value::from(2)),
            (Key::from("n4"), Value::from(4)),
        ]
    );
}

#[test]
fn test_flatten_and_leaves_entry_points() {
    let source = Assoc::list([Value::from("a"), Value::list(["b", "c"])]);
    let flat = flatten(source.clone(), None, "/").unwrap();
    assert_eq!(
        flat,
        assoc! { 0 => "a", 1 => Assoc::list(["b", "c"]), "1/0" => "b", "1/1" => "c" }
    );

    let upper = Transform::map(|v: Value| match v.as_str() {
        Some(s) => Step::Value(Value::from(s.to_uppercase())),
        None => Step::Value(v),
    });
    let leaf_values = leaves(source, Some(upper), "/").unwrap();
    // the transform only applies to the first level
    assert_eq!(leaf_values, assoc! { 0 => "A", "1/0" => "b", "1/1" => "c" });
}

#[test]
fn test_tree_walker_separators() {
    let mut walker = tree(Assoc::list(["x", "y", "z"]), None);
    let mut rendered = String::new();
    walker.rewind().unwrap();
    while walker.valid().unwrap() {
        rendered.push_str(&walker.current().unwrap().to_display_string());
        if walker.is_last().unwrap() == Some(false) {
            rendered.push(',');
        }
        walker.next().unwrap();
    }
    assert_eq!(rendered, "x,y,z");
}

#[test]
fn test_nested_sort_entry_point() {
    let source = assoc! {
        "b" => Assoc::list(["z", "x", "y"]),
        "a" => Assoc::list(["q", "p"]),
    };
    let sorted = sort_nested(
        source,
        &[
            SortSpec::Flags(SortFlags::BY_KEY),
            SortSpec::Flags(SortFlags::STRING | SortFlags::DESC),
        ],
    )
    .unwrap();
    let a = sorted.nth(0).unwrap();
    assert_eq!(a.0, &Key::from("a"));
    assert_eq!(a.1.as_seq().unwrap().clone().into_list(), Assoc::list(["q", "p"]));
}

#[test]
fn test_lazy_props_sort_by_member() {
    let rows: Vec<Value> = [3, 1, 2]
        .into_iter()
        .map(|n| {
            Value::object(LazyProps::new("Row").with_read_only("rank", move |_| Ok(Value::from(n))))
        })
        .collect();
    let sorted = sort(Assoc::list(rows), SortSpec::Columns(vec![Criterion::member("rank")])).unwrap();
    let keys: Vec<Key> = sorted.keys().cloned().collect();
    assert_eq!(keys, vec![Key::from(1), Key::from(2), Key::from(0)]);
}

#[test]
fn test_factory_sources_reread_the_document() {
    let file = write_document(json!({"items": [1, 2]}));
    let path = file.path().to_path_buf();
    let source = Source::factory(move || {
        let document = read_document(File::open(&path)?, &PointerLimits::default())
            .map_err(|e| seqmap_io::SeqError::Transform(e.to_string()))?;
        select(&document, "/items", &PointerLimits::default())
            .map_err(|e| seqmap_io::SeqError::Transform(e.to_string()))
    });

    assert_eq!(traverse(source.clone(), None).unwrap(), Assoc::list([1, 2]));
    serde_json::to_writer(File::create(file.path()).unwrap(), &json!({"items": [9]})).unwrap();
    assert_eq!(traverse(source, None).unwrap(), Assoc::list([9]));
}

#[test]
fn test_pointer_errors_surface_with_context() {
    let document = Value::from(orders());
    let err = select(&document, "/orders/5", &PointerLimits::default()).unwrap_err();
    assert!(matches!(err, SourceError::PointerNotFound { .. }));
    assert!(err.to_string().contains("array") || err.to_string().contains("0, 1, 2"));

    let err = select(&document, "/meta/version", &PointerLimits::default()).unwrap_err();
    assert!(matches!(err, SourceError::PointerTargetWrongType { .. }));
}
