//! Error types for record mapping.

use thiserror::Error;

/// Failures raised while reshaping one record.
///
/// Nothing here is recovered internally: any variant other than
/// [`MapError::InvalidMapping`] aborts the whole mapping pass for the
/// current record, and the caller decides whether to skip, log, or fail the
/// overall harvest. `InvalidMapping` is the one aggregated report — the
/// batch validator collects every violation before raising.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Source resolution: a mid-path key is absent (or null) in the record.
    #[error("no value for `{key}` while resolving `{path}`")]
    MissingKey { path: String, key: String },

    /// Source resolution: a scalar was reached with path segments left.
    #[error("scalar at `{key}` but `{path}` still has segments to resolve")]
    UnexpectedScalar { path: String, key: String },

    /// Source resolution: a list element is a scalar with segments left.
    #[error("scalar list element under `{path}` with segments still to resolve")]
    ScalarListElement { path: String },

    /// Source resolution: list mode entered by a traversal that never
    /// crossed a key lookup allowed to iterate.
    #[error("list under `{path}` reached outside an iterable traversal")]
    ListNotIterable { path: String },

    /// Source resolution: a list nested directly inside a list.
    #[error("list in list under `{path}` is not supported")]
    NestedListUnsupported { path: String },

    /// Schema resolution: a target-path segment is not declared.
    #[error("`{key}` in `{path}` is not defined in the item type schema")]
    UndefinedInSchema { path: String, key: String },

    /// Schema resolution: segments continue past a scalar declaration.
    #[error("`{key}` in `{path}` is declared scalar but segments remain")]
    TrailingSegmentsAfterValue { path: String, key: String },

    /// Schema resolution: the kind sequence violates its own invariants.
    #[error("kind sequence for `{path}` is malformed: {message}")]
    InvalidSchemaPath { path: String, message: String },

    /// Reconciliation: the source value is nested too deeply for the
    /// schema's array count to absorb with a single collapse.
    #[error(
        "value for `{path}` has {dimensions} dimensions but the schema declares {arrays} array levels"
    )]
    TooManyDimensions {
        path: String,
        dimensions: usize,
        arrays: usize,
    },

    /// Reconciliation: collapsing keeps the first element, and an empty
    /// list has none.
    #[error("cannot collapse an empty list for `{path}`")]
    EmptyListCollapse { path: String },

    /// Reconciliation: an array level with no wrapping left to spend needs
    /// a list value to replicate over.
    #[error("`{key}` in `{path}` is an array level but the value is not a list")]
    ArrayRequiresListValue { path: String, key: String },

    /// Reconciliation: a prior rule left a list of a different length at
    /// this key.
    #[error("list at `{key}` in `{path}` has {existing} elements but the value has {incoming}")]
    ArrayLengthMismatch {
        path: String,
        key: String,
        existing: usize,
        incoming: usize,
    },

    /// Reconciliation: a prior rule wrote this key with an incompatible
    /// shape.
    #[error("existing value at `{key}` in `{path}` is not {expected}")]
    ShapeConflict {
        path: String,
        key: String,
        expected: &'static str,
    },

    /// Orchestration: a rule id with a source path but no target path.
    #[error("{id} is not defined.")]
    UndefinedRule { id: String },

    /// Batch validation report; one entry per rule id missing a target path.
    #[error("invalid mapping: {}", .violations.join(" "))]
    InvalidMapping { violations: Vec<String> },
}
