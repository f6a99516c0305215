use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One document in a backend collection: the backend-assigned id plus a
/// free-form field map keyed by wire names (camelCase).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

/// The full set of documents matching a live query at one point in time.
/// Replaced wholesale on every update; never diffed.
pub type Snapshot = Vec<Document>;

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// String field by wire name. None when the field is absent or holds a
    /// non-string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// String field defaulted to the empty string when absent.
    pub fn str_or_empty(&self, key: &str) -> String {
        self.get_str(key).unwrap_or_default().to_string()
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(fields: Value) -> Document {
        match fields {
            Value::Object(map) => Document::new("d1", map),
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn string_accessors_ignore_non_string_values() {
        let d = doc(json!({ "name": "City Hotel", "rating": 4.5 }));
        assert_eq!(d.get_str("name"), Some("City Hotel"));
        assert_eq!(d.get_str("rating"), None);
        assert_eq!(d.str_or_empty("rating"), "");
        assert_eq!(d.str_or_empty("missing"), "");
    }

    #[test]
    fn numeric_accessors() {
        let d = doc(json!({ "createdAt": 1700000000123i64, "rating": 4.5 }));
        assert_eq!(d.get_i64("createdAt"), Some(1700000000123));
        assert_eq!(d.get_f64("rating"), Some(4.5));
        assert_eq!(d.get_i64("rating"), None);
    }
}
