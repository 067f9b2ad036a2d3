//! List-nesting depth of extracted values.

use serde_json::Value;

/// Count the list-nesting levels wrapping a value.
///
/// Scalars and objects are 0, an empty list still counts as one level of
/// listing, and deeper nesting follows the first element only:
///
/// ```
/// use recast_core::dimensions;
/// use serde_json::json;
///
/// assert_eq!(dimensions(&json!(1)), 0);
/// assert_eq!(dimensions(&json!([])), 1);
/// assert_eq!(dimensions(&json!([1, 2, 3])), 1);
/// assert_eq!(dimensions(&json!([[1, 2], [3, 4]])), 2);
/// ```
///
/// A ragged list reports whatever its first branch reports — `[[1, 2], "x"]`
/// is 2. The reconciliation policy in [`crate::apply_rule`] is written
/// against exactly this behavior, so it must not be tightened to scan every
/// element; upstream producers are expected to emit uniform nesting.
pub fn dimensions(value: &Value) -> usize {
    match value {
        Value::Array(items) => match items.first() {
            Some(first) => 1 + dimensions(first),
            None => 1,
        },
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn scalars_have_no_dimensions() {
        assert_eq!(dimensions(&json!(1)), 0);
        assert_eq!(dimensions(&json!("x")), 0);
        assert_eq!(dimensions(&json!(true)), 0);
        assert_eq!(dimensions(&json!(null)), 0);
    }

    #[test]
    fn objects_have_no_dimensions() {
        assert_eq!(dimensions(&json!({"a": [1, 2]})), 0);
    }

    #[test]
    fn empty_list_is_one_level() {
        assert_eq!(dimensions(&json!([])), 1);
    }

    #[test]
    fn nesting_adds_one_level_each() {
        assert_eq!(dimensions(&json!([1, 2, 3])), 1);
        assert_eq!(dimensions(&json!([[1, 2], [3, 4]])), 2);
        assert_eq!(dimensions(&json!([[[1, 2]], [[3, 4]]])), 3);
    }

    #[test]
    fn ragged_list_follows_first_element() {
        // Only the first branch is inspected.
        assert_eq!(dimensions(&json!([[1, 2], "x"])), 2);
        assert_eq!(dimensions(&json!(["x", [1, 2]])), 1);
    }
}
