//! Deserialize raw text into a SpecDocument.
//!
//! A document that is not well-formed YAML, or whose root is not a mapping,
//! fails with a single `parse_error` diagnostic carrying the parser's
//! reported position. One malformed document never aborts a batch run; the
//! failure stays local to that document.

use crate::diag::{codes, Diagnostic, FieldPath, SourceLocation};
use crate::doc::{LineIndex, SpecDocument};
use serde_yaml::Value;
use std::path::Path;

/// Parse `raw` into a SpecDocument. The returned Err is the diagnostic to
/// report for the document, not a process failure.
pub fn load(file: &Path, raw: &str) -> Result<SpecDocument, Diagnostic> {
    let value: Value = match serde_yaml::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            let location = e.location().map(|l| SourceLocation {
                line: l.line(),
                column: l.column(),
            });
            return Err(Diagnostic::error(
                codes::PARSE_ERROR,
                FieldPath::root(),
                format!("not well-formed YAML: {}", e),
            )
            .at(location));
        }
    };

    let root = match value {
        Value::Mapping(m) => m,
        other => {
            return Err(Diagnostic::error(
                codes::PARSE_ERROR,
                FieldPath::root(),
                format!(
                    "document root must be a mapping, found {}",
                    crate::doc::value::kind_of(&other)
                ),
            ));
        }
    };

    Ok(SpecDocument {
        file: file.to_path_buf(),
        root,
        lines: LineIndex::build(raw),
    })
}
