//! Source-side path resolution.
//!
//! Extracts a value from harvested record metadata by following a dotted
//! path. Traversal alternates between object mode (key lookups) and list
//! mode (per-element resolution of the same remaining segments). Object
//! steps never change nesting depth; every list crossed while segments
//! remain adds exactly one dimension to the result. Dimensions come only
//! from lists met along the single traversal path — a list nested directly
//! inside a list is rejected, never counted as an extra dimension.

use serde_json::{Map, Value};

use crate::error::MapError;

/// Resolve `path` against the record metadata map.
///
/// Returns `Ok(None)` when the first segment is not a metadata key at all —
/// the caller skips such rules. Everything else that cannot be resolved is
/// an error that aborts the record's mapping pass.
///
/// ```
/// use recast_core::extract_value;
/// use serde_json::json;
///
/// let metadata = json!({
///     "creator": [
///         { "name": "Ichiro" },
///         { "name": "Jiro" }
///     ]
/// });
/// let value = extract_value(metadata.as_object().unwrap(), "creator.name").unwrap();
/// assert_eq!(value, Some(json!(["Ichiro", "Jiro"])));
/// ```
pub fn extract_value(
    metadata: &Map<String, Value>,
    path: &str,
) -> Result<Option<Value>, MapError> {
    let segments: Vec<&str> = path.split('.').collect();
    let value = match metadata.get(segments[0]) {
        None | Some(Value::Null) => {
            tracing::trace!(path, "no source value at top level, rule will be skipped");
            return Ok(None);
        }
        Some(value) => value,
    };
    let rest = &segments[1..];

    match value {
        Value::Object(object) => {
            if rest.is_empty() {
                Ok(Some(value.clone()))
            } else {
                resolve_object(object, rest, path, false).map(Some)
            }
        }
        Value::Array(items) => {
            if rest.is_empty() {
                Ok(Some(value.clone()))
            } else {
                resolve_list(items, rest, path, true).map(Some)
            }
        }
        scalar => {
            if rest.is_empty() {
                Ok(Some(scalar.clone()))
            } else {
                Err(MapError::UnexpectedScalar {
                    path: path.to_string(),
                    key: segments[0].to_string(),
                })
            }
        }
    }
}

/// Object mode: consume one segment as a key lookup.
///
/// `in_list` latches once a list has been crossed anywhere above; a list
/// found here always latches it before list mode is entered.
fn resolve_object(
    object: &Map<String, Value>,
    segments: &[&str],
    path: &str,
    in_list: bool,
) -> Result<Value, MapError> {
    let key = segments[0];
    let rest = &segments[1..];
    let value = match object.get(key) {
        None | Some(Value::Null) => {
            return Err(MapError::MissingKey {
                path: path.to_string(),
                key: key.to_string(),
            })
        }
        Some(value) => value,
    };

    match value {
        Value::Object(child) => {
            if rest.is_empty() {
                Ok(value.clone())
            } else {
                resolve_object(child, rest, path, in_list)
            }
        }
        Value::Array(items) => {
            if rest.is_empty() {
                Ok(value.clone())
            } else {
                tracing::trace!(key, path, "crossing a list, result gains one dimension");
                resolve_list(items, rest, path, true)
            }
        }
        scalar => {
            if rest.is_empty() {
                Ok(scalar.clone())
            } else {
                Err(MapError::UnexpectedScalar {
                    path: path.to_string(),
                    key: key.to_string(),
                })
            }
        }
    }
}

/// List mode: resolve the same remaining segments against every element,
/// producing one result per element.
fn resolve_list(
    items: &[Value],
    segments: &[&str],
    path: &str,
    in_list: bool,
) -> Result<Value, MapError> {
    if !in_list {
        return Err(MapError::ListNotIterable {
            path: path.to_string(),
        });
    }

    let mut collected = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(child) => {
                collected.push(resolve_object(child, segments, path, in_list)?);
            }
            Value::Array(_) => {
                return Err(MapError::NestedListUnsupported {
                    path: path.to_string(),
                })
            }
            _ => {
                return Err(MapError::ScalarListElement {
                    path: path.to_string(),
                })
            }
        }
    }
    Ok(Value::Array(collected))
}
