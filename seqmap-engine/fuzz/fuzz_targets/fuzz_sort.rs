#![no_main]

use libfuzzer_sys::fuzz_target;
use seqmap_core::{Limits, Source, Value};
use seqmap_engine::{sort, SortFlags, SortSpec};

fuzz_target!(|input: (u8, &[u8])| {
    let (bits, data) = input;
    let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(source) = Source::from_value(&Value::from(json)) else {
        return;
    };

    let spec = SortSpec::Flags(SortFlags::from_bits(u32::from(bits)));
    let limits = Limits::default();
    let Ok(sorted) = sort(&source, &spec, &limits) else {
        return;
    };

    // sorting keeps every key exactly once
    let Source::Seq(original) = &source else {
        return;
    };
    assert_eq!(sorted.len(), original.len());
    for key in original.keys() {
        assert!(sorted.contains_key(key));
    }
});
