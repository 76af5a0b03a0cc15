//! Report renderers over sorted ValidationResults.
//!
//! Three formats: human-readable text, structured JSON, and JUnit-style XML
//! for CI test-report ingestion. Renderers are pure functions returning the
//! full report as a String; the caller owns stdout.

pub mod json;
pub mod junit;
pub mod text;

pub use json::render_json;
pub use junit::render_junit;
pub use text::render_text;
