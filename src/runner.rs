//! Batch runner: discover candidate documents, run the pipeline per document,
//! and produce the ordered result set behind the process exit code.
//!
//! Each document's validation is a pure function of its bytes plus the shared
//! read-only schema (and the stat calls for file references); documents never
//! share state, so processing order is irrelevant. Results are sorted by file
//! path before rendering for a deterministic report.

use crate::diag::{aggregate, codes, Diagnostic, FieldPath, ValidationResult};
use crate::doc::loader;
use crate::schema::SchemaNode;
use crate::{rules, schema, Result};
use anyhow::Context;
use glob::Pattern;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File-name patterns marking a file as an OSpec document.
pub const DEFAULT_PATTERNS: &[&str] = &["*.ospec.yml", "*.ospec.yaml"];

/// Validate every discovered document under `roots`.
pub fn run(roots: &[PathBuf], patterns: &[String], schema: &SchemaNode) -> Result<Vec<ValidationResult>> {
    let files = discover(roots, patterns)?;
    let mut results: Vec<ValidationResult> =
        files.iter().map(|f| validate_file(f, schema)).collect();
    results.sort_by(|a, b| a.file.cmp(&b.file));
    Ok(results)
}

pub fn all_valid(results: &[ValidationResult]) -> bool {
    results.iter().all(|r| r.valid)
}

/// Walk each root collecting files whose name matches any pattern. A root
/// that is itself a file is taken as an explicit candidate, pattern
/// notwithstanding. An unreadable root aborts the run; an unreadable entry
/// inside a tree is skipped with a note on stderr.
pub fn discover(roots: &[PathBuf], patterns: &[String]) -> Result<Vec<PathBuf>> {
    let patterns = compile_patterns(patterns)?;
    let mut found = BTreeSet::new();

    for root in roots {
        let meta = fs::metadata(root)
            .with_context(|| format!("cannot read root path {}", root.display()))?;
        if meta.is_file() {
            found.insert(root.clone());
            continue;
        }

        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    eprintln!("WARN: skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if patterns.iter().any(|p| p.matches(&name)) {
                found.insert(entry.into_path());
            }
        }
    }

    Ok(found.into_iter().collect())
}

/// Full pipeline for one document: read, load, schema-check, semantic rules,
/// aggregate. Failures stay local to the document.
pub fn validate_file(path: &Path, schema: &SchemaNode) -> ValidationResult {
    let file = path.display().to_string();

    let raw = match fs::read_to_string(path) {
        Ok(r) => r,
        Err(e) => {
            // Not a parse error: the bytes never reached the parser.
            let d = Diagnostic::error(
                codes::IO_ERROR,
                FieldPath::root(),
                format!("cannot read file: {}", e),
            );
            return aggregate(&file, vec![d], vec![]);
        }
    };

    let doc = match loader::load(path, &raw) {
        Ok(d) => d,
        Err(d) => return aggregate(&file, vec![d], vec![]),
    };

    let schema_diags = schema::check(&doc, schema);
    let semantic_diags = rules::evaluate(&doc);
    aggregate(&file, schema_diags, semantic_diags)
}

/// Compile the user-supplied file-name patterns once per run. A pattern that
/// is not valid glob syntax is a usage error, reported at the run level.
fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("invalid file pattern '{}'", p)))
        .collect()
}
