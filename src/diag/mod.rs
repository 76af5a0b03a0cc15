//! Diagnostic types + aggregation.
//!
//! Everything a validator reports flows through here:
//! - FieldPath addresses a node in the document tree ("tasks[2].depends_on[0]")
//! - Diagnostic is one finding (severity, stable code, message, path, location)
//! - ValidationResult is the per-document aggregate with the validity flag
//!
//! Codes are stable identifiers consumed by pipelines; never rename them.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// Stable diagnostic codes. Part of the machine-readable output.
pub mod codes {
    pub const IO_ERROR: &str = "io_error";
    pub const PARSE_ERROR: &str = "parse_error";
    pub const TYPE_MISMATCH: &str = "type_mismatch";
    pub const MISSING_REQUIRED_FIELD: &str = "missing_required_field";
    pub const INVALID_FORMAT: &str = "invalid_format";
    pub const INVALID_ENUM_VALUE: &str = "invalid_enum_value";
    pub const OUT_OF_RANGE: &str = "out_of_range";
    pub const EMPTY_COLLECTION: &str = "empty_collection";
    pub const DUPLICATE_TASK_ID: &str = "duplicate_task_id";
    pub const UNKNOWN_DEPENDENCY: &str = "unknown_dependency";
    pub const CIRCULAR_DEPENDENCY: &str = "circular_dependency";
    pub const MISSING_REFERENCED_FILE: &str = "missing_referenced_file";
    pub const ID_FILENAME_MISMATCH: &str = "id_filename_mismatch";
    pub const NO_ACCEPTANCE_CRITERIA: &str = "no_acceptance_criteria";
    pub const UNSUPPORTED_SPEC_VERSION: &str = "unsupported_spec_version";
    pub const SECRET_NAME_CONVENTION: &str = "secret_name_convention";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Display tier: errors first, then warnings, then info.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Error => 0,
            Severity::Warning => 1,
            Severity::Info => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// 1-based source position of a document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

/// One segment of a field path: a mapping key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Path of a node in the document tree. Ordered + hashable so it can be
/// used in BTreeSet/Map keys; displays as "tasks[2].depends_on[0]".
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(pub Vec<Segment>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn of(key: &str) -> Self {
        Self(vec![Segment::Key(key.to_string())])
    }

    pub fn key(&self, key: &str) -> Self {
        let mut segs = self.0.clone();
        segs.push(Segment::Key(key.to_string()));
        Self(segs)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segs = self.0.clone();
        segs.push(Segment::Index(index));
        Self(segs)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "$");
        }
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                Segment::Key(k) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", k)?;
                }
                Segment::Index(n) => write!(f, "[{}]", n)?,
            }
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One reported defect or advisory note. Immutable value object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub path: FieldPath,
    pub location: Option<SourceLocation>,
    pub file: String,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        code: &'static str,
        path: FieldPath,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            path,
            location: None,
            file: String::new(),
        }
    }

    pub fn error(code: &'static str, path: FieldPath, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, path, message)
    }

    pub fn warning(code: &'static str, path: FieldPath, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, path, message)
    }

    pub fn at(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    fn for_file(mut self, file: &str) -> Self {
        self.file = file.to_string();
        self
    }
}

/// Per-document outcome: all diagnostics plus the derived validity flag.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub file: String,
    pub valid: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

/// Combine schema and semantic diagnostics into one result:
/// - exact duplicates (same code + path) collapse to the first occurrence
/// - stable sort by severity tier, insertion order preserved within a tier
/// - valid iff no Error remains
pub fn aggregate(
    file: &str,
    schema_diags: Vec<Diagnostic>,
    semantic_diags: Vec<Diagnostic>,
) -> ValidationResult {
    let mut seen = BTreeSet::<(String, String)>::new();
    let mut all: Vec<Diagnostic> = Vec::new();
    for d in schema_diags.into_iter().chain(semantic_diags) {
        if seen.insert((d.code.to_string(), d.path.to_string())) {
            all.push(d.for_file(file));
        }
    }

    all.sort_by_key(|d| d.severity.rank());

    let valid = all.iter().all(|d| d.severity != Severity::Error);
    ValidationResult {
        file: file.to_string(),
        valid,
        diagnostics: all,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn path_display() {
        let p = FieldPath::of("tasks").index(2).key("depends_on").index(0);
        assert_eq!(p.to_string(), "tasks[2].depends_on[0]");
        assert_eq!(FieldPath::root().to_string(), "$");
    }

    #[test]
    fn aggregate_sorts_errors_first_and_keeps_insertion_order() {
        let schema = vec![
            Diagnostic::warning(codes::ID_FILENAME_MISMATCH, FieldPath::of("id"), "w1"),
            Diagnostic::error(codes::TYPE_MISMATCH, FieldPath::of("name"), "e1"),
        ];
        let semantic = vec![
            Diagnostic::error(codes::UNKNOWN_DEPENDENCY, FieldPath::of("tasks"), "e2"),
            Diagnostic::warning(codes::MISSING_REFERENCED_FILE, FieldPath::of("scripts"), "w2"),
        ];
        let result = aggregate("a.ospec.yml", schema, semantic);

        let codes: Vec<&str> = result.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                codes::TYPE_MISMATCH,
                codes::UNKNOWN_DEPENDENCY,
                codes::ID_FILENAME_MISMATCH,
                codes::MISSING_REFERENCED_FILE,
            ]
        );
        assert!(!result.valid);
        assert_eq!(result.error_count(), 2);
        assert_eq!(result.warning_count(), 2);
        assert!(result.diagnostics.iter().all(|d| d.file == "a.ospec.yml"));
    }

    #[test]
    fn aggregate_dedupes_same_code_and_path() {
        let d = Diagnostic::error(codes::TYPE_MISMATCH, FieldPath::of("name"), "dup");
        let result = aggregate("a.ospec.yml", vec![d.clone()], vec![d]);
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn warnings_do_not_affect_validity() {
        let result = aggregate(
            "a.ospec.yml",
            vec![],
            vec![Diagnostic::warning(
                codes::MISSING_REFERENCED_FILE,
                FieldPath::of("scripts"),
                "missing",
            )],
        );
        assert!(result.valid);
    }
}
