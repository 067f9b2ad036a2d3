//! Mapping-rule table and its batch validator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// The two id-aligned rule tables: where a value comes from in the source
/// record, and where it lands in the target schema. A rule exists as such
/// only at lookup time — an id paired with its entry from each table.
///
/// `BTreeMap` keeps rule application and violation reports in a
/// deterministic id order.
///
/// ## Serialization format
///
/// Field names are kebab-case (`source-paths`, `target-paths`), matching
/// the on-disk mapping files the CLI loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MappingTable {
    /// rule id → dotted path into the record metadata.
    pub source_paths: BTreeMap<String, String>,
    /// rule id → dotted path into the target schema.
    pub target_paths: BTreeMap<String, String>,
}

impl MappingTable {
    pub fn new(
        source_paths: BTreeMap<String, String>,
        target_paths: BTreeMap<String, String>,
    ) -> Self {
        Self {
            source_paths,
            target_paths,
        }
    }

    /// Check that every rule with a source path also has a target path.
    ///
    /// All violations are collected before reporting, one
    /// `"{id} is not defined."` entry per missing id — never fail-fast on
    /// the first. This checks existence only; structural compatibility
    /// surfaces later, rule by rule, while the tree is built.
    pub fn validate(&self) -> Result<(), MapError> {
        let violations: Vec<String> = self
            .source_paths
            .keys()
            .filter(|id| !self.target_paths.contains_key(*id))
            .map(|id| format!("{id} is not defined."))
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(MapError::InvalidMapping { violations })
        }
    }

    /// Convenience form of [`MappingTable::validate`].
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
