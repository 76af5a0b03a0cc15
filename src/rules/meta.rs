//! Document-level consistency rules: id/filename convention, acceptance
//! completeness, spec-format version support, secret naming.

use crate::diag::{codes, Diagnostic, FieldPath};
use crate::doc::value::field;
use crate::doc::SpecDocument;
use crate::schema::node::{semver_major, SUPPORTED_MAJOR_VERSIONS};
use regex::Regex;
use std::sync::LazyLock;

static SECRET_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap());

/// The declared id should match the filename with the `.ospec.yml` /
/// `.ospec.yaml` marker stripped. Advisory only.
pub fn id_matches_filename(doc: &SpecDocument) -> Vec<Diagnostic> {
    let Some(id) = doc.str_field("id") else {
        return Vec::new();
    };
    let Some(name) = doc.file.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };
    let Some(stem) = name
        .strip_suffix(".ospec.yml")
        .or_else(|| name.strip_suffix(".ospec.yaml"))
    else {
        return Vec::new();
    };

    if id != stem {
        let path = FieldPath::of("id");
        let location = doc.location(&path);
        return vec![
            Diagnostic::warning(
                codes::ID_FILENAME_MISMATCH,
                path,
                format!("id '{}' does not match filename-derived id '{}'", id, stem),
            )
            .at(location),
        ];
    }
    Vec::new()
}

/// The acceptance section must contain at least one concrete, checkable
/// criterion: an endpoint check, a test-file reference, a UX flow, or a
/// performance threshold. Present-but-empty is an Error.
pub fn acceptance_criteria(doc: &SpecDocument) -> Vec<Diagnostic> {
    let Some(acceptance) = doc.map_field("acceptance") else {
        return Vec::new();
    };

    let has_entries = |key: &str| {
        field(acceptance, key).is_some_and(|v| match v {
            serde_yaml::Value::Sequence(s) => !s.is_empty(),
            serde_yaml::Value::Mapping(m) => !m.is_empty(),
            _ => false,
        })
    };

    let concrete = ["http_endpoints", "tests", "ux_flows", "performance"]
        .into_iter()
        .any(has_entries);

    if concrete {
        return Vec::new();
    }
    let path = FieldPath::of("acceptance");
    let location = doc.location(&path);
    vec![
        Diagnostic::error(
            codes::NO_ACCEPTANCE_CRITERIA,
            path,
            "acceptance section contains no checkable criteria \
             (expected http_endpoints, tests, ux_flows or performance)",
        )
        .at(location),
    ]
}

/// The engine only understands spec-format major version 1. A version that
/// fails the SemVer pattern is the schema validator's finding, not ours.
pub fn spec_version_supported(doc: &SpecDocument) -> Vec<Diagnostic> {
    let Some(version) = doc.str_field("ospec_version") else {
        return Vec::new();
    };
    let Some(major) = semver_major(version) else {
        return Vec::new();
    };

    if SUPPORTED_MAJOR_VERSIONS.contains(&major) {
        return Vec::new();
    }
    let path = FieldPath::of("ospec_version");
    let location = doc.location(&path);
    vec![
        Diagnostic::error(
            codes::UNSUPPORTED_SPEC_VERSION,
            path,
            format!(
                "ospec_version {} is not supported (supported major versions: {})",
                version,
                SUPPORTED_MAJOR_VERSIONS
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )
        .at(location),
    ]
}

/// Secret names conventionally look like environment variables. Advisory.
pub fn secret_names(doc: &SpecDocument) -> Vec<Diagnostic> {
    let Some(secrets) = doc.seq_field("secrets") else {
        return Vec::new();
    };

    let base = FieldPath::of("secrets");
    let mut out = Vec::new();
    for (i, item) in secrets.iter().enumerate() {
        let Some(name) = item.as_str() else {
            continue;
        };
        if !SECRET_NAME_RE.is_match(name) {
            let path = base.index(i);
            let location = doc.location(&path);
            out.push(
                Diagnostic::warning(
                    codes::SECRET_NAME_CONVENTION,
                    path,
                    format!("secret name '{}' is not SCREAMING_SNAKE_CASE", name),
                )
                .at(location),
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::Severity;
    use crate::rules::testutil::{doc, doc_at};
    use pretty_assertions::assert_eq;

    #[test]
    fn id_mismatch_is_a_warning() {
        let d = doc_at("docs/todo-api.ospec.yml", "id: other-name\n");
        let diags = id_matches_filename(&d);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::ID_FILENAME_MISMATCH);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert!(diags[0].message.contains("'todo-api'"));
    }

    #[test]
    fn matching_id_is_clean() {
        let d = doc_at("docs/todo-api.ospec.yml", "id: todo-api\n");
        assert_eq!(id_matches_filename(&d), vec![]);
    }

    #[test]
    fn unconventional_filename_is_a_no_op() {
        let d = doc_at("docs/notes.yml", "id: todo-api\n");
        assert_eq!(id_matches_filename(&d), vec![]);
    }

    #[test]
    fn empty_acceptance_is_an_error() {
        let d = doc("acceptance: {}\n");
        let diags = acceptance_criteria(&d);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::NO_ACCEPTANCE_CRITERIA);
        assert_eq!(diags[0].path.to_string(), "acceptance");
    }

    #[test]
    fn acceptance_with_empty_lists_is_still_an_error() {
        let d = doc("acceptance:\n  tests: []\n  ux_flows: []\n");
        assert_eq!(acceptance_criteria(&d).len(), 1);
    }

    #[test]
    fn one_test_reference_satisfies_acceptance() {
        let d = doc("acceptance:\n  tests:\n    - file: tests/a.test.ts\n");
        assert_eq!(acceptance_criteria(&d), vec![]);
    }

    #[test]
    fn performance_thresholds_count_as_criteria() {
        let d = doc("acceptance:\n  performance:\n    p95_ms: 250\n");
        assert_eq!(acceptance_criteria(&d), vec![]);
    }

    #[test]
    fn absent_acceptance_is_a_no_op() {
        let d = doc("id: sample\n");
        assert_eq!(acceptance_criteria(&d), vec![]);
    }

    #[test]
    fn unsupported_major_version_is_an_error() {
        let d = doc("ospec_version: 2.0.0\n");
        let diags = spec_version_supported(&d);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::UNSUPPORTED_SPEC_VERSION);
        assert!(diags[0].message.contains("2.0.0"));
    }

    #[test]
    fn supported_version_and_malformed_version_are_clean_here() {
        assert_eq!(spec_version_supported(&doc("ospec_version: 1.4.2\n")), vec![]);
        // Malformed versions are the schema validator's invalid_format.
        assert_eq!(spec_version_supported(&doc("ospec_version: latest\n")), vec![]);
    }

    #[test]
    fn lowercase_secret_names_are_flagged() {
        let d = doc("secrets:\n  - DATABASE_URL\n  - api_key\n");
        let diags = secret_names(&d);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].path.to_string(), "secrets[1]");
        assert_eq!(diags[0].severity, Severity::Warning);
    }
}
