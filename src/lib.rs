//! # patchbase
//!
//! Deduplicates a set of rendered resource manifests of the same kind into
//! one shared base document plus a minimal strategic patch per original
//! instance, such that merging a patch into the base reproduces the original
//! exactly.
//!
//! Diffing is schema-directed: per-field merge semantics (recurse, replace,
//! or merge-by-key for lists) are resolved from OpenAPI schema documents
//! carrying the usual vendor extensions.
//!
//! ## Modules
//!
//! - [`value`] - In-memory representation of YAML/JSON documents
//! - [`schema`] - OpenAPI document set and per-field merge metadata
//! - [`diff`] - Two-way strategic patches, subtraction, and ordering reconstruction
//! - [`extract`] - Partitioning, base narrowing, and patch generation
//! - [`error`] - Crate-wide error taxonomy

pub mod diff;
pub mod error;
pub mod extract;
pub mod schema;
pub mod value;

pub use diff::{reorder_patch, subtract, two_way_patch};
pub use error::{Error, Result};
pub use extract::{parse_documents, PatchGenerator, PatchPartition, PatchSource, PartitionOutcome};
pub use schema::{PatchMetadata, SchemaContext, SchemaIndex, TypeIdentity};
pub use value::{Map, Value};
