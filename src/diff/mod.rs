//! Diff module - two-way strategic patches and ordering reconstruction.
//!
//! This module computes the minimal patch between two document trees, the
//! subtraction used to narrow a shared base, and the normalization pass that
//! applies ordering directives to emitted patches.

mod engine;
mod ordering;


pub use engine::*;
pub use ordering::*;
