//! Document layer: raw YAML text -> SpecDocument.
//!
//! Owns loading, the line index used for located diagnostics, and the typed
//! accessors the semantic rules use to no-op on shapes the schema validator
//! has already reported.

pub mod lines;
pub mod loader;
pub mod value;

pub use lines::LineIndex;
pub use value::SpecDocument;
