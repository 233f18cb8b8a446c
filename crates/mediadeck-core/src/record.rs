//! Schema-free record model.
//!
//! The API does not publish a schema; every entity arrives as a JSON
//! object and is displayed from whatever keys it actually carries. A
//! [`Record`] wraps one such object, a [`RecordPage`] wraps one listing
//! response.

use serde_json::{Map, Value};

/// One record as returned by the API: an opaque field-name → value map.
#[derive(Debug, Clone, PartialEq)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wrap a JSON value if it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Field names in the order the API sent them.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// String value of a field, `None` when absent, null, or non-string.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn bool_field(&self, field: &str) -> Option<bool> {
        self.0.get(field).and_then(Value::as_bool)
    }

    pub fn i64_field(&self, field: &str) -> Option<i64> {
        self.0.get(field).and_then(Value::as_i64)
    }

    pub fn f64_field(&self, field: &str) -> Option<f64> {
        self.0.get(field).and_then(Value::as_f64)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One listing response: records plus whatever pagination metadata the
/// endpoint provides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPage {
    pub records: Vec<Record>,
    /// Server-side total across all pages, when reported.
    pub total: Option<u64>,
    /// Total page count, when reported.
    pub pages: Option<u64>,
}

impl RecordPage {
    /// Parse a listing response body.
    ///
    /// Endpoints answer with a `{"data": [...], "total": n, "pages": n}`
    /// envelope, a bare array, or (for exact-match lookups) a single
    /// object; all three shapes are accepted.
    pub fn from_response(body: Value) -> Self {
        match body {
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) => Self {
                    records: collect_records(items),
                    total: map.get("total").and_then(Value::as_u64),
                    pages: map.get("pages").and_then(Value::as_u64),
                },
                Some(other) => Self {
                    records: Record::from_value(other).into_iter().collect(),
                    total: map.get("total").and_then(Value::as_u64),
                    pages: map.get("pages").and_then(Value::as_u64),
                },
                // No envelope: the object itself is the record.
                None => Self {
                    records: vec![Record::new(map)],
                    total: None,
                    pages: None,
                },
            },
            Value::Array(items) => Self {
                records: collect_records(items),
                total: None,
                pages: None,
            },
            _ => Self::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Union of field names across all records, in first-seen order.
    ///
    /// This is what turns a schema-free response into table columns.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for record in &self.records {
            for name in record.field_names() {
                if !columns.iter().any(|c| c == name) {
                    columns.push(name.to_string());
                }
            }
        }
        columns
    }

    /// First record whose `field` equals `value`, if any.
    pub fn find_by_str(&self, field: &str, value: &str) -> Option<&Record> {
        self.records
            .iter()
            .find(|record| record.str_field(field) == Some(value))
    }
}

fn collect_records(items: Vec<Value>) -> Vec<Record> {
    items.into_iter().filter_map(Record::from_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_data_envelope() {
        let body = json!({
            "data": [
                {"imdb_id": "tt1234567", "media_title": "Alien"},
                {"imdb_id": "tt7654321", "media_title": "Heat"},
            ],
            "total": 41,
            "pages": 2,
        });
        let page = RecordPage::from_response(body);
        assert_eq!(page.len(), 2);
        assert_eq!(page.total, Some(41));
        assert_eq!(page.pages, Some(2));
        assert_eq!(page.records[0].str_field("media_title"), Some("Alien"));
    }

    #[test]
    fn parses_bare_array() {
        let body = json!([{"hash": "abc"}, {"hash": "def"}]);
        let page = RecordPage::from_response(body);
        assert_eq!(page.len(), 2);
        assert_eq!(page.total, None);
    }

    #[test]
    fn parses_single_object_as_one_record() {
        let body = json!({"hash": "abc", "pipeline_status": "parsed"});
        let page = RecordPage::from_response(body);
        assert_eq!(page.len(), 1);
        assert_eq!(page.records[0].str_field("pipeline_status"), Some("parsed"));
    }

    #[test]
    fn non_object_items_are_skipped() {
        let body = json!({"data": [{"a": 1}, 7, "x", {"b": 2}]});
        let page = RecordPage::from_response(body);
        assert_eq!(page.len(), 2);
    }

    #[test]
    fn columns_are_union_in_first_seen_order() {
        let body = json!({
            "data": [
                {"imdb_id": "tt0000001", "label": "would_watch"},
                {"imdb_id": "tt0000002", "rt_score": 91},
            ]
        });
        let page = RecordPage::from_response(body);
        assert_eq!(page.columns(), ["imdb_id", "label", "rt_score"]);
    }

    #[test]
    fn typed_accessors_ignore_wrong_types() {
        let record = Record::from_value(json!({
            "title": "Alien",
            "year": 1979,
            "score": 8.5,
            "reviewed": false,
            "label": null,
        }))
        .unwrap();
        assert_eq!(record.str_field("title"), Some("Alien"));
        assert_eq!(record.i64_field("year"), Some(1979));
        assert_eq!(record.f64_field("score"), Some(8.5));
        assert_eq!(record.bool_field("reviewed"), Some(false));
        assert_eq!(record.str_field("label"), None);
        assert_eq!(record.str_field("year"), None);
        assert_eq!(record.str_field("missing"), None);
    }

    #[test]
    fn find_by_str_matches_identifier() {
        let page = RecordPage::from_response(json!({
            "data": [
                {"imdb_id": "tt0000001", "label": "would_watch"},
                {"imdb_id": "tt0000002", "label": "would_not_watch"},
            ]
        }));
        let found = page.find_by_str("imdb_id", "tt0000002").unwrap();
        assert_eq!(found.str_field("label"), Some("would_not_watch"));
        assert!(page.find_by_str("imdb_id", "tt9999999").is_none());
    }
}
