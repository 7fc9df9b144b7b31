//! Safe serialization.
//!
//! Converts arbitrary runtime value graphs into JSON-compatible trees
//! without ever failing: unknown shapes reduce to string form, broken
//! fields degrade to placeholders, and cycles are cut with a sentinel.
//! Every record builder in the crate goes through this module.

mod safe;
mod value;

pub use safe::{serialize, CIRCULAR_MARKER};
pub use value::{FieldError, FieldSource, RawValue};
