//! Target-schema path resolution.
//!
//! Walks an item-type schema along a dotted target path and classifies each
//! segment as object, array, or scalar. The resulting kind sequence is what
//! drives the tree builder's reshaping decisions — in particular the number
//! of `array` entries it contains.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::MapError;

/// Structural classification of one target-path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Declared `type: "object"` — nesting continues in `properties`.
    Object,
    /// Declared `type: "array"` — nesting continues in `items.properties`.
    Array,
    /// Any other declaration — a terminal scalar property.
    Scalar,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::Object => write!(f, "object"),
            SegmentKind::Array => write!(f, "array"),
            SegmentKind::Scalar => write!(f, "scalar"),
        }
    }
}

/// Resolve the kind of every segment of a dotted target path.
///
/// Traversal starts at the schema document's top-level `properties` map and
/// descends one declared property per segment. A path must end on a scalar
/// declaration; extending past one is a contradiction in the mapping
/// configuration, not in the record data.
///
/// ```
/// use recast_core::{resolve_kinds, SegmentKind};
/// use serde_json::json;
///
/// let schema = json!({
///     "properties": {
///         "a": {
///             "type": "array",
///             "items": { "properties": { "b": { "type": "string" } } }
///         }
///     }
/// });
/// let kinds = resolve_kinds(&schema, "a.b").unwrap();
/// assert_eq!(kinds, vec![SegmentKind::Array, SegmentKind::Scalar]);
/// ```
pub fn resolve_kinds(schema: &Value, path: &str) -> Result<Vec<SegmentKind>, MapError> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut kinds = Vec::with_capacity(segments.len());
    let mut properties = schema.get("properties").and_then(Value::as_object);

    for (i, segment) in segments.iter().enumerate() {
        let node = properties
            .and_then(|props| props.get(*segment))
            .ok_or_else(|| MapError::UndefinedInSchema {
                path: path.to_string(),
                key: (*segment).to_string(),
            })?;

        let kind = match node.get("type").and_then(Value::as_str) {
            Some("object") => {
                properties = node.get("properties").and_then(Value::as_object);
                SegmentKind::Object
            }
            Some("array") => {
                properties = items_properties(node);
                SegmentKind::Array
            }
            _ => {
                if i + 1 != segments.len() {
                    return Err(MapError::TrailingSegmentsAfterValue {
                        path: path.to_string(),
                        key: (*segment).to_string(),
                    });
                }
                SegmentKind::Scalar
            }
        };
        tracing::trace!(segment = *segment, kind = %kind, "classified target segment");
        kinds.push(kind);
    }

    // Invariants of the sequence itself, re-verified even though the loop
    // above cannot currently produce anything else.
    if kinds.len() != segments.len() {
        return Err(MapError::InvalidSchemaPath {
            path: path.to_string(),
            message: format!("{} kinds for {} segments", kinds.len(), segments.len()),
        });
    }
    if kinds.last() != Some(&SegmentKind::Scalar) {
        return Err(MapError::InvalidSchemaPath {
            path: path.to_string(),
            message: "last segment kind must be scalar".to_string(),
        });
    }
    Ok(kinds)
}

/// The property map describing one element of an array declaration.
fn items_properties(node: &Value) -> Option<&Map<String, Value>> {
    node.get("items")
        .and_then(|items| items.get("properties"))
        .and_then(Value::as_object)
}
