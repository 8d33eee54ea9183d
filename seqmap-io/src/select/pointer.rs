//! RFC 6901 JSON Pointer parsing and navigation over seqmap values

use super::error::SourceError;
use seqmap_core::{Assoc, Key, Value};

/// Split a JSON Pointer into unescaped tokens
///
/// The empty pointer names the document root and yields no tokens.
pub fn parse_pointer(
    pointer: &str,
    max_length: usize,
    max_depth: usize,
) -> Result<Vec<String>, SourceError> {
    let invalid = |reason: String| SourceError::InvalidPointer {
        pointer: pointer.to_string(),
        reason,
    };

    if pointer.len() > max_length {
        return Err(SourceError::PointerTooLong {
            pointer: pointer.to_string(),
            length: pointer.len(),
            max_length,
        });
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        if pointer.is_empty() {
            return Ok(Vec::new());
        }
        return Err(invalid("missing leading '/'".to_string()));
    };

    let depth = rest.matches('/').count() + 1;
    if depth > max_depth {
        return Err(SourceError::DepthLimitExceeded {
            pointer: pointer.to_string(),
            depth,
            max_depth,
        });
    }

    rest.split('/')
        .map(|token| {
            check_escapes(token).map_err(invalid)?;
            Ok(unescape_pointer_token(token))
        })
        .collect()
}

/// Unescape a pointer token: `~1` becomes `/`, then `~0` becomes `~`
pub fn unescape_pointer_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Escape a string for use as a pointer token
pub fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Every `~` must be followed by `0` or `1`
fn check_escapes(token: &str) -> Result<(), String> {
    for (offset, _) in token.match_indices('~') {
        match token[offset + 1..].chars().next() {
            Some('0' | '1') => {}
            Some(other) => return Err(format!("unknown escape '~{other}' in '{token}'")),
            None => return Err(format!("dangling '~' at the end of '{token}'")),
        }
    }
    Ok(())
}

/// Look a token up in a sequence: string key first, then integer key
fn lookup<'a>(seq: &'a Assoc, token: &str) -> Option<&'a Value> {
    seq.get(&Key::from(token)).or_else(|| {
        token
            .parse::<i64>()
            .ok()
            .filter(|n| n.to_string() == token)
            .and_then(|n| seq.get(&Key::Int(n)))
    })
}

fn available_keys(seq: &Assoc) -> String {
    if seq.is_empty() {
        return "<empty sequence>".to_string();
    }
    let shown: Vec<String> = seq.keys().take(10).map(Key::to_string).collect();
    if seq.len() > 10 {
        format!("{}, ... ({} total)", shown.join(", "), seq.len())
    } else {
        shown.join(", ")
    }
}

/// Navigate to the value a token list points at
///
/// Sequences are searched by key; objects by property name.
pub fn navigate_pointer(
    value: &Value,
    tokens: &[String],
    original_pointer: &str,
) -> Result<Value, SourceError> {
    let mut current = value.clone();
    let mut path_so_far = String::new();

    for token in tokens {
        let reached = if path_so_far.is_empty() {
            "/".to_string()
        } else {
            path_so_far.clone()
        };
        path_so_far.push('/');
        path_so_far.push_str(&escape_pointer_token(token));

        let next = match &current {
            Value::Seq(seq) => {
                lookup(seq, token)
                    .cloned()
                    .ok_or_else(|| SourceError::PointerNotFound {
                        pointer: original_pointer.to_string(),
                        reached_path: reached.clone(),
                        available_keys: available_keys(seq),
                    })?
            }
            Value::Object(object) => {
                object
                    .property(token)
                    .ok_or_else(|| SourceError::PointerNotFound {
                        pointer: original_pointer.to_string(),
                        reached_path: reached.clone(),
                        available_keys: format!("<{} without property '{}'>", object.type_name(), token),
                    })?
            }
            other => {
                return Err(SourceError::PointerNotFound {
                    pointer: original_pointer.to_string(),
                    reached_path: reached,
                    available_keys: format!("<{}, cannot traverse further>", other.kind().name()),
                });
            }
        };
        current = next;
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn parse_pointer_validates_length() {
        let long_pointer = format!("/{}", "a".repeat(300));
        let result = parse_pointer(&long_pointer, 256, 10);
        assert!(matches!(result, Err(SourceError::PointerTooLong { .. })));
    }

    #[test]
    fn parse_pointer_validates_depth() {
        let result = parse_pointer("/a/b/c/d/e/f/g/h/i/j/k", 256, 10);
        assert!(matches!(result, Err(SourceError::DepthLimitExceeded { .. })));
    }

    #[test]
    fn parse_pointer_rejects_invalid_start() {
        let result = parse_pointer("data/field", 256, 10);
        assert!(matches!(result, Err(SourceError::InvalidPointer { .. })));
    }

    #[test]
    fn parse_pointer_handles_root() {
        assert_eq!(parse_pointer("", 256, 10).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn parse_pointer_unescapes_tokens() {
        let result = parse_pointer("/a~1b/c~0d", 256, 10).unwrap();
        assert_eq!(result, vec!["a/b".to_string(), "c~d".to_string()]);
    }

    #[test]
    fn parse_pointer_validates_escape_sequences() {
        assert!(matches!(
            parse_pointer("/invalid~2", 256, 10),
            Err(SourceError::InvalidPointer { .. })
        ));
        assert!(matches!(
            parse_pointer("/trailing~", 256, 10),
            Err(SourceError::InvalidPointer { .. })
        ));
    }

    #[test]
    fn escape_and_unescape_roundtrip() {
        let original = "hello/world~test";
        assert_eq!(unescape_pointer_token(&escape_pointer_token(original)), original);
    }

    #[test]
    fn navigate_pointer_finds_nested_list() {
        let document = doc(json!({"data": {"users": [{"name": "alice"}, {"name": "bob"}]}}));
        let tokens = parse_pointer("/data/users", 256, 10).unwrap();
        let users = navigate_pointer(&document, &tokens, "/data/users").unwrap();
        assert_eq!(users.as_seq().map(Assoc::len), Some(2));
    }

    #[test]
    fn navigate_pointer_handles_list_index() {
        let document = doc(json!({"items": ["a", "b", "c"]}));
        let tokens = parse_pointer("/items/1", 256, 10).unwrap();
        assert_eq!(navigate_pointer(&document, &tokens, "/items/1").unwrap(), Value::from("b"));
    }

    #[test]
    fn navigate_pointer_rejects_padded_index() {
        let document = doc(json!({"items": ["a", "b"]}));
        let tokens = parse_pointer("/items/01", 256, 10).unwrap();
        assert!(matches!(
            navigate_pointer(&document, &tokens, "/items/01"),
            Err(SourceError::PointerNotFound { .. })
        ));
    }

    #[test]
    fn navigate_pointer_reports_available_keys() {
        let document = doc(json!({"data": {"a": 1, "b": 2}}));
        let tokens = parse_pointer("/data/users", 256, 10).unwrap();
        match navigate_pointer(&document, &tokens, "/data/users") {
            Err(SourceError::PointerNotFound {
                reached_path,
                available_keys,
                ..
            }) => {
                assert_eq!(reached_path, "/data");
                assert_eq!(available_keys, "a, b");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn navigate_pointer_errors_on_scalar() {
        let document = doc(json!({"data": "string"}));
        let tokens = parse_pointer("/data/field", 256, 10).unwrap();
        assert!(matches!(
            navigate_pointer(&document, &tokens, "/data/field"),
            Err(SourceError::PointerNotFound { .. })
        ));
    }

    #[test]
    fn navigate_pointer_with_escaped_keys() {
        let document = doc(json!({"field/name": {"value": 42}}));
        let tokens = parse_pointer("/field~1name/value", 256, 10).unwrap();
        assert_eq!(
            navigate_pointer(&document, &tokens, "/field~1name/value").unwrap(),
            Value::from(42)
        );
    }
}
