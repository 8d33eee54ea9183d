//! Conversion between seqmap values and `serde_json` values

use crate::assoc::Assoc;
use crate::key::Key;
use crate::value::Value;
use serde_json::{Map, Number, Value as Json};
use std::rc::Rc;

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::Str(s),
            Json::Array(items) => Value::list(items.into_iter().map(Value::from)),
            Json::Object(map) => Value::Seq(Rc::new(
                map.into_iter()
                    .map(|(k, v)| (Key::Str(k), Value::from(v)))
                    .collect(),
            )),
        }
    }
}

impl Value {
    /// Render as JSON. List-like sequences become arrays, other sequences
    /// objects with stringified keys. Non-finite floats become `null` and
    /// opaque objects their type name.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::Number(Number::from(*n)),
            Value::Float(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Value::Str(s) => Json::String(s.clone()),
            Value::Seq(seq) => seq.to_json(),
            Value::Object(object) => Json::String(object.type_name().to_string()),
        }
    }
}

impl Assoc {
    /// Render as a JSON array (list-like keys) or object
    pub fn to_json(&self) -> Json {
        if self.is_list() {
            return Json::Array(self.values().map(Value::to_json).collect());
        }
        let mut map = Map::with_capacity(self.len());
        for (key, value) in self.iter() {
            map.insert(key.to_string(), value.to_json());
        }
        Json::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn imports_nested_documents() {
        let value = Value::from(json!({"users": [{"name": "a", "age": 3}], "ok": true}));
        let seq = value.as_seq().unwrap();
        let users = seq.get(&Key::from("users")).unwrap().as_seq().unwrap();
        assert!(users.is_list());
        let first = users.get(&Key::from(0)).unwrap().as_seq().unwrap();
        assert_eq!(first.get(&Key::from("age")), Some(&Value::Int(3)));
    }

    #[test]
    fn exports_lists_as_arrays_and_maps_as_objects() {
        assert_eq!(Value::list(["a", "b"]).to_json(), json!(["a", "b"]));

        let mut assoc = Assoc::new();
        assoc.insert(Key::from(1), Value::from("x"));
        assoc.insert(Key::from("1/0"), Value::Float(1.5));
        assert_eq!(assoc.to_json(), json!({"1": "x", "1/0": 1.5}));
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(Value::Float(f64::INFINITY).to_json(), Json::Null);
    }
}
