//! Recast — schema-driven reshaping of harvested record metadata.
//!
//! Given one harvested source record (an arbitrarily nested JSON tree), a
//! table of mapping rules (source path → target path), and an item-type
//! schema declaring the nesting shape expected at each target path, recast
//! produces a new tree whose shape matches the schema and whose leaf values
//! come from the record.
//!
//! The core problem is reconciling two independently-varying notions of
//! nesting depth: how deeply a value is listed in the source record versus
//! how many array levels the schema declares for its target path. Every
//! mismatch resolves deterministically — collapse one level, wrap in a
//! single-element list, replicate per element, or fail.
//!
//! # Example
//!
//! ```
//! use recast_core::{map_record, MapError, MappingTable, SourceDocument};
//! use serde_json::json;
//!
//! fn main() -> Result<(), MapError> {
//!     let schema = json!({
//!         "properties": {
//!             "item_title": { "type": "string" },
//!             "item_creator": {
//!                 "type": "array",
//!                 "items": { "properties": { "name": { "type": "string" } } }
//!             }
//!         }
//!     });
//!     let record = SourceDocument::new(json!({
//!         "record": {
//!             "header": {
//!                 "publish_status": "public",
//!                 "indextree": "1623632832836",
//!                 "datestamp": "2024-05-01"
//!             },
//!             "metadata": {
//!                 "title": "A study of reshaping",
//!                 "creator": [ { "name": "Ichiro" }, { "name": "Jiro" } ]
//!             }
//!         }
//!     }));
//!     let mapping: MappingTable = serde_json::from_value(json!({
//!         "source-paths": { "r1": "title", "r2": "creator.name" },
//!         "target-paths": { "r1": "item_title", "r2": "item_creator.name" }
//!     }))?;
//!
//!     let tree = map_record(&record, &schema, &mapping)?;
//!     assert_eq!(tree["item_title"], json!("A study of reshaping"));
//!     assert_eq!(
//!         tree["item_creator"],
//!         json!([ { "name": "Ichiro" }, { "name": "Jiro" } ])
//!     );
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod dimensions;
pub mod document;
pub mod error;
pub mod extract;
pub mod mapper;
pub mod mapping;
pub mod schema;

pub use builder::apply_rule;
pub use dimensions::dimensions;
pub use document::SourceDocument;
pub use error::MapError;
pub use extract::extract_value;
pub use mapper::map_record;
pub use mapping::MappingTable;
pub use schema::{resolve_kinds, SegmentKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
