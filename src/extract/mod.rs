//! Extract module - partitioning, base narrowing, and patch generation.
//!
//! The entry point is [`PatchGenerator`], which turns a set of decoded
//! resource manifests into one [`PatchPartition`] per resource type: a shared
//! base plus a minimal patch per original instance.

mod encoding;
mod generator;


pub use encoding::*;
pub use generator::*;
