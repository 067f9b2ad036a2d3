//! Read-only view over one harvested source record.

use serde_json::{Map, Value};

use crate::error::MapError;

/// One harvested record, as handed over by the source-document provider.
///
/// The interesting shape is `record.header.*` — pass-through fields and the
/// tombstone marker — and `record.metadata.*`, the tree that mapping rules
/// resolve against. The document is immutable for the duration of a pass.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    json: Value,
}

impl SourceDocument {
    pub fn new(json: Value) -> Self {
        Self { json }
    }

    /// Parse a document from raw JSON text.
    pub fn from_str(text: &str) -> Result<Self, MapError> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    /// Parse a document from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, MapError> {
        Ok(Self::new(serde_json::from_slice(bytes)?))
    }

    fn header(&self) -> Option<&Value> {
        self.json.get("record").and_then(|record| record.get("header"))
    }

    /// Header field lookup; absent fields read as null and pass through
    /// as-is.
    fn header_field(&self, key: &str) -> Value {
        self.header()
            .and_then(|header| header.get(key))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Whether the record is a tombstone. Deleted records map to an empty
    /// tree.
    pub fn is_deleted(&self) -> bool {
        self.header()
            .and_then(|header| header.get("deleted"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The harvest datestamp, passed through as the output `pubdate`.
    pub fn datestamp(&self) -> Value {
        self.header_field("datestamp")
    }

    pub fn publish_status(&self) -> Value {
        self.header_field("publish_status")
    }

    /// The index-tree handle the record was harvested under.
    pub fn indextree(&self) -> Value {
        self.header_field("indextree")
    }

    /// The metadata subtree that mapping rules resolve against.
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.json
            .get("record")
            .and_then(|record| record.get("metadata"))
            .and_then(Value::as_object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> SourceDocument {
        SourceDocument::new(json!({
            "record": {
                "header": {
                    "publish_status": "public",
                    "indextree": "1623632832836",
                    "datestamp": "2024-05-01",
                    "deleted": false
                },
                "metadata": { "title": "t" }
            }
        }))
    }

    #[test]
    fn header_fields_pass_through() {
        let doc = document();
        assert_eq!(doc.datestamp(), json!("2024-05-01"));
        assert_eq!(doc.publish_status(), json!("public"));
        assert_eq!(doc.indextree(), json!("1623632832836"));
    }

    #[test]
    fn absent_header_fields_read_as_null() {
        let doc = SourceDocument::new(json!({"record": {"header": {}}}));
        assert_eq!(doc.datestamp(), Value::Null);
        assert_eq!(doc.publish_status(), Value::Null);
    }

    #[test]
    fn deleted_flag() {
        assert!(!document().is_deleted());
        let doc = SourceDocument::new(json!({
            "record": { "header": { "deleted": true } }
        }));
        assert!(doc.is_deleted());
        // Missing header means not deleted.
        assert!(!SourceDocument::new(json!({})).is_deleted());
    }

    #[test]
    fn metadata_lookup() {
        assert_eq!(
            document().metadata().and_then(|m| m.get("title")),
            Some(&json!("t"))
        );
        assert!(SourceDocument::new(json!({})).metadata().is_none());
    }

    #[test]
    fn from_str_round_trip() {
        let doc = SourceDocument::from_str(r#"{"record": {"header": {"deleted": true}}}"#)
            .expect("valid JSON");
        assert!(doc.is_deleted());
        assert!(SourceDocument::from_str("not json").is_err());
    }
}
