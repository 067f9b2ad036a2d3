//! Output-tree construction.
//!
//! The reconciliation core: writes one rule's extracted value into the
//! shared output tree at the shape its target schema declares. Two
//! independent notions of depth meet here — how deeply the value is listed
//! in the source record, and how many array levels the schema declares for
//! the target path — and every mismatch resolves deterministically:
//!
//! - one level too deep → collapse, keeping the first element only
//! - deeper than that → reject
//! - schema arrays with no matching source list → single-element wrappers
//! - schema array matched by a source list → replicate per element

use serde_json::{Map, Value};

use crate::dimensions::dimensions;
use crate::error::MapError;
use crate::schema::SegmentKind;

/// Write one mapping rule's value into `output`.
///
/// `kinds` must be the kind sequence resolved for `target_path` — same
/// segment count, scalar last. Objects and single-element list wrappers
/// already created by earlier rules sharing a path prefix are reused, so
/// successive rules merge into one tree. Scalar leaves overwrite on
/// re-application; replicated list levels do not (a second rule writes into
/// the existing elements, and must bring a list of the same length).
pub fn apply_rule(
    output: &mut Map<String, Value>,
    target_path: &str,
    kinds: &[SegmentKind],
    value: Value,
) -> Result<(), MapError> {
    let segments: Vec<&str> = target_path.split('.').collect();
    if kinds.is_empty() || kinds.len() != segments.len() {
        return Err(MapError::InvalidSchemaPath {
            path: target_path.to_string(),
            message: format!("{} kinds for {} segments", kinds.len(), segments.len()),
        });
    }

    let arrays = kinds.iter().filter(|k| **k == SegmentKind::Array).count();
    let mut value = value;
    let mut dims = dimensions(&value);

    // Source one list too deep for the schema: keep the first element only,
    // a deliberate lossy simplification. Any deeper mismatch cannot be
    // bridged by a single collapse.
    if dims > arrays {
        if dims - arrays == 1 {
            value = first_element(value, target_path)?;
            dims = dimensions(&value);
            tracing::trace!(path = target_path, dims, "collapsed one list level");
        } else {
            return Err(MapError::TooManyDimensions {
                path: target_path.to_string(),
                dimensions: dims,
                arrays,
            });
        }
    }

    // Schema array levels the source has no list for; each one becomes a
    // single-element wrapper instead of per-element replication.
    let diff_array = arrays - dims;

    if segments.len() == 1 {
        // Terminal write at the top call: a residual list keeps only its
        // first element.
        let leaf = if dims > 0 {
            first_element(value, target_path)?
        } else {
            value
        };
        if !leaf.is_null() {
            output.insert(segments[0].to_string(), leaf);
        }
        return Ok(());
    }

    let key = segments[0];
    match kinds[0] {
        // resolve_kinds rejects this shape up front; direct callers get the
        // same contradiction reported here.
        SegmentKind::Scalar => Err(MapError::TrailingSegmentsAfterValue {
            path: target_path.to_string(),
            key: key.to_string(),
        }),
        SegmentKind::Object => {
            let child = object_slot(output, key, target_path)?;
            apply_child(diff_array, child, &segments[1..], &kinds[1..], value, target_path)
        }
        SegmentKind::Array => {
            if diff_array > 0 {
                let child = wrapper_slot(output, key, target_path)?;
                apply_child(
                    diff_array - 1,
                    child,
                    &segments[1..],
                    &kinds[1..],
                    value,
                    target_path,
                )
            } else {
                replicate(output, key, &segments[1..], &kinds[1..], value, dims, target_path)
            }
        }
    }
}

/// Recursive descent below the first segment; same object/array/scalar
/// policy, with one difference: leaf writes skip nulls, so no leaves are
/// ever created for missing data below the top call.
fn apply_child(
    diff_array: usize,
    node: &mut Map<String, Value>,
    segments: &[&str],
    kinds: &[SegmentKind],
    value: Value,
    target_path: &str,
) -> Result<(), MapError> {
    let key = segments[0];

    if segments.len() == 1 {
        if !value.is_null() {
            node.insert(key.to_string(), value);
        }
        return Ok(());
    }

    match kinds[0] {
        // Cannot come out of resolve_kinds before the last segment; treated
        // as a terminal write for direct callers.
        SegmentKind::Scalar => {
            if !value.is_null() {
                node.insert(key.to_string(), value);
            }
            Ok(())
        }
        SegmentKind::Object => {
            let child = object_slot(node, key, target_path)?;
            apply_child(diff_array, child, &segments[1..], &kinds[1..], value, target_path)
        }
        SegmentKind::Array => {
            if diff_array > 0 {
                let child = wrapper_slot(node, key, target_path)?;
                apply_child(
                    diff_array - 1,
                    child,
                    &segments[1..],
                    &kinds[1..],
                    value,
                    target_path,
                )
            } else {
                let dims = dimensions(&value);
                replicate(node, key, &segments[1..], &kinds[1..], value, dims, target_path)
            }
        }
    }
}

/// An array level matched by a source list: ensure a list of the same
/// length exists at `key`, then recurse once per index with the matching
/// element. `diff_array` is already 0 here and stays 0 for the tail.
fn replicate(
    parent: &mut Map<String, Value>,
    key: &str,
    segments: &[&str],
    kinds: &[SegmentKind],
    value: Value,
    dims: usize,
    target_path: &str,
) -> Result<(), MapError> {
    if dims == 0 {
        return Err(MapError::ArrayRequiresListValue {
            path: target_path.to_string(),
            key: key.to_string(),
        });
    }
    let Value::Array(items) = value else {
        // dims > 0 implies a list; ragged inputs can still land here when a
        // first-element count promised nesting a sibling does not have.
        return Err(MapError::ArrayRequiresListValue {
            path: target_path.to_string(),
            key: key.to_string(),
        });
    };

    let slot = parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(items.iter().map(|_| Value::Object(Map::new())).collect()));
    let existing = slot.as_array_mut().ok_or_else(|| MapError::ShapeConflict {
        path: target_path.to_string(),
        key: key.to_string(),
        expected: "a list",
    })?;
    if existing.len() != items.len() {
        return Err(MapError::ArrayLengthMismatch {
            path: target_path.to_string(),
            key: key.to_string(),
            existing: existing.len(),
            incoming: items.len(),
        });
    }

    for (slot, item) in existing.iter_mut().zip(items) {
        let child = slot.as_object_mut().ok_or_else(|| MapError::ShapeConflict {
            path: target_path.to_string(),
            key: key.to_string(),
            expected: "an object",
        })?;
        apply_child(0, child, segments, kinds, item, target_path)?;
    }
    Ok(())
}

/// Create-or-reuse a nested object at `key`.
fn object_slot<'a>(
    parent: &'a mut Map<String, Value>,
    key: &str,
    target_path: &str,
) -> Result<&'a mut Map<String, Value>, MapError> {
    parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| MapError::ShapeConflict {
            path: target_path.to_string(),
            key: key.to_string(),
            expected: "an object",
        })
}

/// Create-or-reuse a single-element list wrapper at `key` and descend into
/// its sole element.
fn wrapper_slot<'a>(
    parent: &'a mut Map<String, Value>,
    key: &str,
    target_path: &str,
) -> Result<&'a mut Map<String, Value>, MapError> {
    let slot = parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(vec![Value::Object(Map::new())]));
    let items = slot.as_array_mut().ok_or_else(|| MapError::ShapeConflict {
        path: target_path.to_string(),
        key: key.to_string(),
        expected: "a list",
    })?;
    let first = items
        .first_mut()
        .ok_or_else(|| MapError::ArrayLengthMismatch {
            path: target_path.to_string(),
            key: key.to_string(),
            existing: 0,
            incoming: 1,
        })?;
    first.as_object_mut().ok_or_else(|| MapError::ShapeConflict {
        path: target_path.to_string(),
        key: key.to_string(),
        expected: "an object",
    })
}

/// First element of a collapsing list.
fn first_element(value: Value, target_path: &str) -> Result<Value, MapError> {
    let Value::Array(items) = value else {
        return Ok(value);
    };
    items
        .into_iter()
        .next()
        .ok_or_else(|| MapError::EmptyListCollapse {
            path: target_path.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SegmentKind::{Array, Object, Scalar};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn apply(
        output: &mut Map<String, Value>,
        path: &str,
        kinds: &[SegmentKind],
        value: Value,
    ) -> Result<(), MapError> {
        apply_rule(output, path, kinds, value)
    }

    // -----------------------------------------------------------------------
    // Terminal writes
    // -----------------------------------------------------------------------

    #[test]
    fn scalar_leaf() {
        let mut out = Map::new();
        apply(&mut out, "p", &[Scalar], json!("x")).unwrap();
        assert_eq!(Value::Object(out), json!({"p": "x"}));
    }

    #[test]
    fn scalar_leaf_overwrites_on_reapplication() {
        let mut out = Map::new();
        apply(&mut out, "p", &[Scalar], json!("x")).unwrap();
        apply(&mut out, "p", &[Scalar], json!("y")).unwrap();
        assert_eq!(Value::Object(out), json!({"p": "y"}));
    }

    // -----------------------------------------------------------------------
    // Reconciliation: collapse
    // -----------------------------------------------------------------------

    #[test]
    fn one_extra_dimension_collapses_to_first_element() {
        // d=2 against a=1: only the first top-level element survives.
        let mut out = Map::new();
        apply(
            &mut out,
            "p.q",
            &[Array, Scalar],
            json!([["x", "y"], ["z"]]),
        )
        .unwrap();
        assert_eq!(Value::Object(out), json!({"p": [{"q": "x"}, {"q": "y"}]}));
    }

    #[test]
    fn list_into_scalar_path_collapses() {
        let mut out = Map::new();
        apply(&mut out, "p", &[Scalar], json!(["x", "y"])).unwrap();
        assert_eq!(Value::Object(out), json!({"p": "x"}));
    }

    #[test]
    fn two_extra_dimensions_fail() {
        let mut out = Map::new();
        let err = apply(
            &mut out,
            "p.q",
            &[Array, Scalar],
            json!([[["x"]]]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MapError::TooManyDimensions { dimensions: 3, arrays: 1, .. }
        ));
    }

    #[test]
    fn collapsing_an_empty_list_fails() {
        let mut out = Map::new();
        let err = apply(&mut out, "p", &[Scalar], json!([])).unwrap_err();
        assert!(matches!(err, MapError::EmptyListCollapse { .. }));
    }

    // -----------------------------------------------------------------------
    // Reconciliation: replicate and single-wrap
    // -----------------------------------------------------------------------

    #[test]
    fn list_replicates_across_array_level() {
        let mut out = Map::new();
        apply(&mut out, "p.q", &[Array, Scalar], json!(["x", "y"])).unwrap();
        assert_eq!(Value::Object(out), json!({"p": [{"q": "x"}, {"q": "y"}]}));
    }

    #[test]
    fn scalar_gets_single_element_wrapper() {
        let mut out = Map::new();
        apply(&mut out, "p.q", &[Array, Scalar], json!("x")).unwrap();
        assert_eq!(Value::Object(out), json!({"p": [{"q": "x"}]}));
    }

    #[test]
    fn empty_list_replicates_to_empty_list() {
        // d=1 matches a=1; zero elements means zero replicas.
        let mut out = Map::new();
        apply(&mut out, "p.q", &[Array, Scalar], json!([])).unwrap();
        assert_eq!(Value::Object(out), json!({"p": []}));
    }

    #[test]
    fn wrapper_then_replication_for_deeper_schema() {
        // d=1 against a=2: the outer level wraps once, the inner replicates.
        let mut out = Map::new();
        apply(
            &mut out,
            "p.q.r",
            &[Array, Array, Scalar],
            json!(["x", "y"]),
        )
        .unwrap();
        assert_eq!(
            Value::Object(out),
            json!({"p": [{"q": [{"r": "x"}, {"r": "y"}]}]})
        );
    }

    #[test]
    fn two_dimensions_replicate_both_levels() {
        let mut out = Map::new();
        apply(
            &mut out,
            "p.q.r",
            &[Array, Array, Scalar],
            json!([["a", "b"], ["c"]]),
        )
        .unwrap();
        assert_eq!(
            Value::Object(out),
            json!({"p": [
                {"q": [{"r": "a"}, {"r": "b"}]},
                {"q": [{"r": "c"}]}
            ]})
        );
    }

    #[test]
    fn ragged_value_fails_where_nesting_runs_out() {
        // dimensions() saw 2 levels in the first branch; the second branch
        // has only a scalar where a list is required.
        let mut out = Map::new();
        let err = apply(
            &mut out,
            "p.q.r",
            &[Array, Array, Scalar],
            json!([["a"], "b"]),
        )
        .unwrap_err();
        assert!(matches!(err, MapError::ArrayRequiresListValue { .. }));
    }

    // -----------------------------------------------------------------------
    // Merging across rules
    // -----------------------------------------------------------------------

    #[test]
    fn rules_sharing_an_object_prefix_merge() {
        let mut out = Map::new();
        apply(&mut out, "p.q", &[Object, Scalar], json!("x")).unwrap();
        apply(&mut out, "p.r", &[Object, Scalar], json!("y")).unwrap();
        assert_eq!(Value::Object(out), json!({"p": {"q": "x", "r": "y"}}));
    }

    #[test]
    fn rules_sharing_a_wrapper_prefix_merge() {
        let mut out = Map::new();
        apply(&mut out, "p.q", &[Array, Scalar], json!("x")).unwrap();
        apply(&mut out, "p.r", &[Array, Scalar], json!("y")).unwrap();
        assert_eq!(Value::Object(out), json!({"p": [{"q": "x", "r": "y"}]}));
    }

    #[test]
    fn rules_sharing_a_replicated_prefix_merge_elementwise() {
        let mut out = Map::new();
        apply(&mut out, "p.q", &[Array, Scalar], json!(["x", "y"])).unwrap();
        apply(&mut out, "p.r", &[Array, Scalar], json!(["1", "2"])).unwrap();
        assert_eq!(
            Value::Object(out),
            json!({"p": [{"q": "x", "r": "1"}, {"q": "y", "r": "2"}]})
        );
    }

    #[test]
    fn replicated_length_mismatch_fails() {
        let mut out = Map::new();
        apply(&mut out, "p.q", &[Array, Scalar], json!(["x", "y"])).unwrap();
        let err = apply(&mut out, "p.r", &[Array, Scalar], json!(["1"])).unwrap_err();
        assert!(matches!(
            err,
            MapError::ArrayLengthMismatch { existing: 2, incoming: 1, .. }
        ));
    }

    #[test]
    fn shape_conflict_with_prior_scalar() {
        let mut out = Map::new();
        apply(&mut out, "p", &[Scalar], json!("x")).unwrap();
        let err = apply(&mut out, "p.q", &[Object, Scalar], json!("y")).unwrap_err();
        assert!(matches!(
            err,
            MapError::ShapeConflict { expected: "an object", .. }
        ));
    }

    // -----------------------------------------------------------------------
    // Null handling and degenerate input
    // -----------------------------------------------------------------------

    #[test]
    fn null_leaf_is_skipped_below_the_top() {
        let mut out = Map::new();
        apply(&mut out, "p.q", &[Object, Scalar], json!(null)).unwrap();
        assert_eq!(Value::Object(out), json!({"p": {}}));
    }

    #[test]
    fn mismatched_kind_count_fails() {
        let mut out = Map::new();
        let err = apply(&mut out, "p.q", &[Scalar], json!("x")).unwrap_err();
        assert!(matches!(err, MapError::InvalidSchemaPath { .. }));
    }
}
