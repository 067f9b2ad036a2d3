//! One full mapping pass over a harvested record.

use serde_json::{Map, Value};

use crate::builder::apply_rule;
use crate::document::SourceDocument;
use crate::error::MapError;
use crate::extract::extract_value;
use crate::mapping::MappingTable;
use crate::schema::resolve_kinds;

/// Map one record into the shape its item-type schema declares.
///
/// Deleted records short-circuit to an empty tree. Fixed header fields
/// (`pubdate`, `publish_status`, `path`) are copied through first; each
/// mapping rule then resolves its kind sequence, extracts its source value,
/// and writes into a shared metadata tree. Rules whose source value is
/// absent are skipped silently. The metadata tree wins any key collision
/// with the fixed fields.
///
/// The pass is all-or-nothing: the first resolution or reconciliation
/// failure aborts it, and no partial tree is returned.
pub fn map_record(
    document: &SourceDocument,
    schema: &Value,
    mapping: &MappingTable,
) -> Result<Map<String, Value>, MapError> {
    if document.is_deleted() {
        tracing::debug!("record is deleted, mapping to an empty tree");
        return Ok(Map::new());
    }

    let mut result = Map::new();
    result.insert("pubdate".to_string(), document.datestamp());
    result.insert("publish_status".to_string(), document.publish_status());
    result.insert(
        "path".to_string(),
        Value::Array(vec![document.indextree()]),
    );

    let empty = Map::new();
    let source = document.metadata().unwrap_or(&empty);

    let mut metadata = Map::new();
    for (id, source_path) in &mapping.source_paths {
        let target_path =
            mapping
                .target_paths
                .get(id)
                .ok_or_else(|| MapError::UndefinedRule { id: id.clone() })?;
        let kinds = resolve_kinds(schema, target_path)?;
        let Some(value) = extract_value(source, source_path)? else {
            tracing::debug!(rule = %id, source = %source_path, "no source value, skipping rule");
            continue;
        };
        tracing::trace!(rule = %id, target = %target_path, "applying rule");
        apply_rule(&mut metadata, target_path, &kinds, value)?;
    }

    result.extend(metadata);
    Ok(result)
}
