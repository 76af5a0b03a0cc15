//! Schema layer: declarative constraint tree + recursive conformance check.
//!
//! The SchemaNode tree is built once per process and shared read-only across
//! every document in a batch run. Unknown keys are deliberately not errors;
//! only declared fields are constrained (forward-compatible documents).

pub mod check;
pub mod node;

pub use check::check;
pub use node::{ospec_schema, Pattern, SchemaNode, SchemaType};
