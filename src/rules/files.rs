//! Referenced-file existence checks.
//!
//! `scripts[].path` and `prompts[]` name files relative to the document's
//! own directory. A reference that does not resolve is a Warning, not an
//! Error: the file may be generated by a later pipeline stage. A stat that
//! fails for environment reasons (permissions) also stays a Warning, phrased
//! as "could not be verified", so transient trouble never fails validation.

use crate::diag::{codes, Diagnostic, FieldPath};
use crate::doc::value::field;
use crate::doc::SpecDocument;
use serde_yaml::Value;
use std::io::ErrorKind;

pub fn referenced_files(doc: &SpecDocument) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for (path, reference) in collect_references(doc) {
        check_reference(doc, path, &reference, &mut out);
    }
    out
}

/// Path-bearing fields: (field path, relative file reference).
fn collect_references(doc: &SpecDocument) -> Vec<(FieldPath, String)> {
    let mut refs = Vec::new();

    if let Some(scripts) = doc.seq_field("scripts") {
        let base = FieldPath::of("scripts");
        for (i, item) in scripts.iter().enumerate() {
            let Some(map) = item.as_mapping() else {
                continue;
            };
            if let Some(p) = field(map, "path").and_then(Value::as_str) {
                refs.push((base.index(i).key("path"), p.to_string()));
            }
        }
    }

    if let Some(prompts) = doc.seq_field("prompts") {
        let base = FieldPath::of("prompts");
        for (i, item) in prompts.iter().enumerate() {
            if let Some(p) = item.as_str() {
                refs.push((base.index(i), p.to_string()));
            }
        }
    }

    refs
}

fn check_reference(
    doc: &SpecDocument,
    path: FieldPath,
    reference: &str,
    out: &mut Vec<Diagnostic>,
) {
    let resolved = doc.base_dir().join(reference);
    // A bounded stat, no content read, no retry.
    let message = match std::fs::metadata(&resolved) {
        Ok(_) => return,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            format!("referenced file '{}' does not exist", reference)
        }
        Err(e) => format!("referenced file '{}' could not be verified: {}", reference, e),
    };
    let location = doc.location(&path);
    out.push(Diagnostic::warning(codes::MISSING_REFERENCED_FILE, path, message).at(location));
}
