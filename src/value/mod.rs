//! Value module - In-memory representation of YAML/JSON documents.
//!
//! Documents are trees of [`Value`]; objects keep their fields in sorted
//! order so traversal and serialized output are reproducible.

mod value;

pub use value::*;
