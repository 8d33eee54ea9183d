use predicates::prelude::*;
use serde_json::{json, Value};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct SampleFile {
    dir: TempDir,
    path: PathBuf,
}

fn write_sample(doc: &Value) -> Result<SampleFile, Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("input.json");
    fs::write(&path, serde_json::to_vec(doc)?)?;
    Ok(SampleFile { dir, path })
}

fn orders() -> Value {
    json!({
        "meta": {"version": 2},
        "orders": [
            {"id": "o-10", "customer": "ann", "total": 30},
            {"id": "o-2", "customer": "bob", "total": 12},
            {"id": "o-7", "customer": "ann", "total": 12}
        ]
    })
}

fn run_json(args: &[&str]) -> Result<Value, Box<dyn Error>> {
    let output = assert_cmd::Command::cargo_bin("seqmap")?
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    Ok(serde_json::from_slice(&output)?)
}

#[test]
fn flatten_keeps_inner_nodes() -> Result<(), Box<dyn Error>> {
    let sample = write_sample(&json!({"a": {"b": 1, "c": [2, 3]}, "d": 4}))?;
    let value = run_json(&["flatten", sample.path.to_str().unwrap()])?;
    assert_eq!(value["a"], json!({"b": 1, "c": [2, 3]}));
    assert_eq!(value["a/c"], json!([2, 3]));
    assert_eq!(value["a/c/1"], json!(3));
    assert_eq!(value["d"], json!(4));
    Ok(())
}

#[test]
fn leaves_use_custom_glue() -> Result<(), Box<dyn Error>> {
    let sample = write_sample(&json!({"a": {"b": 1, "c": [2, 3]}, "d": 4}))?;
    let value = run_json(&["leaves", sample.path.to_str().unwrap(), "--glue", "."])?;
    assert_eq!(value, json!({"a.b": 1, "a.c.0": 2, "a.c.1": 3, "d": 4}));
    Ok(())
}

#[test]
fn group_by_member_keeps_original_keys() -> Result<(), Box<dyn Error>> {
    let sample = write_sample(&orders())?;
    let value = run_json(&[
        "group",
        sample.path.to_str().unwrap(),
        "--pointer",
        "/orders",
        "--by",
        "customer",
    ])?;
    let groups = value.as_object().unwrap();
    assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["ann", "bob"]);
    assert_eq!(value["ann"]["0"]["id"], "o-10");
    assert_eq!(value["ann"]["2"]["id"], "o-7");
    assert_eq!(value["bob"]["1"]["id"], "o-2");
    Ok(())
}

#[test]
fn group_without_members_fails() -> Result<(), Box<dyn Error>> {
    let sample = write_sample(&orders())?;
    assert_cmd::Command::cargo_bin("seqmap")?
        .args(["group", sample.path.to_str().unwrap(), "--pointer", "/orders"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--by"));
    Ok(())
}

#[test]
fn group_missing_member_fails() -> Result<(), Box<dyn Error>> {
    let sample = write_sample(&orders())?;
    assert_cmd::Command::cargo_bin("seqmap")?
        .args([
            "group",
            sample.path.to_str().unwrap(),
            "--pointer",
            "/orders",
            "--by",
            "region",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("region"));
    Ok(())
}

#[test]
fn sort_by_member_descending_is_stable() -> Result<(), Box<dyn Error>> {
    let sample = write_sample(&orders())?;
    let value = run_json(&[
        "sort",
        sample.path.to_str().unwrap(),
        "--pointer",
        "/orders",
        "--by",
        "total",
        "--desc",
    ])?;
    let ids: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|order| order["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["o-10", "o-2", "o-7"]);
    Ok(())
}

#[test]
fn sort_with_keys_reports_original_positions() -> Result<(), Box<dyn Error>> {
    let sample = write_sample(&json!([3, 1, 2]))?;
    let value = run_json(&["sort", sample.path.to_str().unwrap(), "--with-keys"])?;
    assert_eq!(value, json!([[1, 1], [2, 2], [0, 3]]));
    Ok(())
}

#[test]
fn sort_natural_case_insensitive() -> Result<(), Box<dyn Error>> {
    let sample = write_sample(&json!(["img12.png", "IMG10.png", "img2.png", "img1.png"]))?;
    let value = run_json(&[
        "sort",
        sample.path.to_str().unwrap(),
        "--mode",
        "natural",
        "--case-insensitive",
    ])?;
    assert_eq!(
        value,
        json!(["img1.png", "img2.png", "IMG10.png", "img12.png"])
    );
    Ok(())
}

#[test]
fn sort_columns_come_from_config() -> Result<(), Box<dyn Error>> {
    let sample = write_sample(&orders())?;
    let config = sample.dir.path().join("seqmap.toml");
    fs::write(
        &config,
        r#"
pointer = "/orders"

[[sort]]
member = "total"

[[sort]]
member = "id"
mode = "natural"
descending = true
"#,
    )?;
    let value = run_json(&[
        "sort",
        sample.path.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ])?;
    let ids: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|order| order["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["o-7", "o-2", "o-10"]);
    Ok(())
}

#[test]
fn invalid_config_is_reported() -> Result<(), Box<dyn Error>> {
    let sample = write_sample(&orders())?;
    let config = sample.dir.path().join("bad.toml");
    fs::write(&config, "unknown_key = 1\n")?;
    assert_cmd::Command::cargo_bin("seqmap")?
        .args([
            "flatten",
            sample.path.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
    Ok(())
}

#[test]
fn tree_renders_branch_markers() -> Result<(), Box<dyn Error>> {
    let sample = write_sample(&json!({"a": {"b": 1}, "c": 2}))?;
    assert_cmd::Command::cargo_bin("seqmap")?
        .args(["tree", sample.path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("├─ a\n  └─ b: 1\n└─ c: 2\n");
    Ok(())
}

#[test]
fn reads_document_from_stdin() -> Result<(), Box<dyn Error>> {
    let output = assert_cmd::Command::cargo_bin("seqmap")?
        .args(["leaves", "--compact"])
        .write_stdin(r#"{"x": [1, {"y": true}]}"#)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output)?;
    assert_eq!(value, json!({"x/0": 1, "x/1/y": true}));
    Ok(())
}

#[test]
fn missing_pointer_lists_available_keys() -> Result<(), Box<dyn Error>> {
    let sample = write_sample(&orders())?;
    assert_cmd::Command::cargo_bin("seqmap")?
        .args(["flatten", sample.path.to_str().unwrap(), "--pointer", "/order"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("orders"));
    Ok(())
}

#[test]
fn scalar_pointer_target_fails() -> Result<(), Box<dyn Error>> {
    let sample = write_sample(&orders())?;
    assert_cmd::Command::cargo_bin("seqmap")?
        .args(["sort", sample.path.to_str().unwrap(), "--pointer", "/meta/version"])
        .assert()
        .failure();
    Ok(())
}
