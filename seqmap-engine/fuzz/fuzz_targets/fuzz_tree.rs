#![no_main]

use libfuzzer_sys::fuzz_target;
use seqmap_core::{Limits, Source, Value};
use seqmap_engine::Pipeline;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(source) = Source::from_value(&Value::from(json)) else {
        return;
    };

    let limits = Limits {
        max_tree_depth: 64,
        ..Limits::default()
    };
    let pipeline = Pipeline::new(source).with_limits(limits);

    if let (Ok(flat), Ok(leaves)) = (pipeline.flatten("/"), pipeline.leaves("/")) {
        assert!(leaves.len() <= flat.len());
    }
    let _ = pipeline.tree_lines("  ");
});
