//! Schema module - OpenAPI document set and per-field merge metadata.
//!
//! Resource schemas are loaded from OpenAPI documents carrying vendor
//! extensions; a cheaply copyable [`SchemaContext`] handle navigates them
//! one field at a time to resolve merge semantics during diffing.

mod document;
mod identity;
mod index;
mod resolver;

pub use document::*;
pub use identity::*;
pub use index::*;
pub use resolver::*;
