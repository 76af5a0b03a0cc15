//! Recursive structural walk of a SpecDocument against a SchemaNode tree.
//!
//! Every applicable constraint at a node is evaluated even after one fails,
//! so a single pass surfaces every structural defect. A required field that
//! is entirely absent is reported once and not recursed into. Unknown keys
//! pass untouched; only declared fields are constrained.

use crate::diag::{codes, Diagnostic, FieldPath};
use crate::doc::value::{field, kind_of};
use crate::doc::SpecDocument;
use crate::schema::node::{SchemaNode, SchemaType};
use serde_yaml::Value;

pub fn check(doc: &SpecDocument, schema: &SchemaNode) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let root = Value::Mapping(doc.root.clone());
    walk(doc, &root, schema, FieldPath::root(), &mut out);
    out
}

fn emit(
    doc: &SpecDocument,
    out: &mut Vec<Diagnostic>,
    code: &'static str,
    path: FieldPath,
    message: String,
) {
    let location = doc.location(&path);
    out.push(Diagnostic::error(code, path, message).at(location));
}

fn type_matches(kind: SchemaType, value: &Value) -> bool {
    match kind {
        SchemaType::String => value.is_string(),
        SchemaType::Number => value.is_number(),
        SchemaType::Bool => value.is_bool(),
        SchemaType::Sequence => value.is_sequence(),
        SchemaType::Mapping => value.is_mapping(),
    }
}

fn walk(
    doc: &SpecDocument,
    value: &Value,
    schema: &SchemaNode,
    path: FieldPath,
    out: &mut Vec<Diagnostic>,
) {
    if !type_matches(schema.kind, value) {
        emit(
            doc,
            out,
            codes::TYPE_MISMATCH,
            path,
            format!(
                "expected {}, found {}",
                schema.kind.label(),
                kind_of(value)
            ),
        );
        // The remaining constraints assume the declared type.
        return;
    }

    match value {
        Value::String(s) => check_string(doc, s, schema, path, out),
        Value::Number(n) => {
            if let Some(v) = n.as_f64() {
                check_number(doc, v, schema, path, out);
            }
        }
        Value::Sequence(items) => {
            if let Some(min) = schema.min_items {
                if items.len() < min {
                    emit(
                        doc,
                        out,
                        codes::EMPTY_COLLECTION,
                        path.clone(),
                        format!("expected at least {} item(s), found {}", min, items.len()),
                    );
                }
            }
            if let Some(item_schema) = &schema.items {
                for (i, item) in items.iter().enumerate() {
                    walk(doc, item, item_schema, path.index(i), out);
                }
            }
        }
        Value::Mapping(map) => {
            if let Some(min) = schema.min_items {
                if map.len() < min {
                    emit(
                        doc,
                        out,
                        codes::EMPTY_COLLECTION,
                        path.clone(),
                        format!("expected at least {} entry(ies), found {}", min, map.len()),
                    );
                }
            }
            for key in &schema.required {
                if field(map, key).is_none() {
                    emit(
                        doc,
                        out,
                        codes::MISSING_REQUIRED_FIELD,
                        path.key(key),
                        format!("missing required field '{}'", key),
                    );
                }
            }
            for (key, prop_schema) in &schema.properties {
                if let Some(v) = field(map, key) {
                    walk(doc, v, prop_schema, path.key(key), out);
                }
            }
            if let Some(value_schema) = &schema.values {
                for (k, v) in map {
                    if let Some(key) = k.as_str() {
                        // Declared properties already walked above.
                        if !schema.properties.contains_key(key) {
                            walk(doc, v, value_schema, path.key(key), out);
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

fn check_string(
    doc: &SpecDocument,
    s: &str,
    schema: &SchemaNode,
    path: FieldPath,
    out: &mut Vec<Diagnostic>,
) {
    if let Some(pattern) = schema.pattern {
        if !pattern.matches(s) {
            emit(
                doc,
                out,
                codes::INVALID_FORMAT,
                path.clone(),
                format!("'{}' is not {}", s, pattern.describe()),
            );
        }
    }
    if let Some(allowed) = schema.allowed {
        if !allowed.contains(&s) {
            emit(
                doc,
                out,
                codes::INVALID_ENUM_VALUE,
                path.clone(),
                format!("'{}' is not one of: {}", s, allowed.join(", ")),
            );
        }
    }
    let len = s.chars().count();
    let below = schema.min_len.is_some_and(|min| len < min);
    let above = schema.max_len.is_some_and(|max| len > max);
    if below || above {
        emit(
            doc,
            out,
            codes::OUT_OF_RANGE,
            path,
            format!(
                "string length {} is outside {}..={}",
                len,
                schema.min_len.unwrap_or(0),
                schema
                    .max_len
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "unbounded".to_string()),
            ),
        );
    }
}

fn check_number(
    doc: &SpecDocument,
    v: f64,
    schema: &SchemaNode,
    path: FieldPath,
    out: &mut Vec<Diagnostic>,
) {
    let below = schema.min.is_some_and(|min| v < min);
    let above = schema.max.is_some_and(|max| v > max);
    if below || above {
        let bounds = match (schema.min, schema.max) {
            (Some(min), Some(max)) => format!("{}..={}", min, max),
            (Some(min), None) => format!(">= {}", min),
            (None, Some(max)) => format!("<= {}", max),
            (None, None) => unreachable!(),
        };
        emit(
            doc,
            out,
            codes::OUT_OF_RANGE,
            path,
            format!("value {} is outside the allowed range ({})", v, bounds),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::loader;
    use crate::schema::ospec_schema;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const MINIMAL: &str = "\
ospec_version: 1.0.0
id: sample
name: Sample
description: A sample outcome spec.
outcome_type: api
acceptance:
  tests:
    - file: tests/api.test.ts
stack:
  backend: fastapi
";

    fn diags_for(raw: &str) -> Vec<Diagnostic> {
        let doc = loader::load(Path::new("docs/sample.ospec.yml"), raw).expect("well-formed");
        check(&doc, &ospec_schema())
    }

    fn codes_of(diags: &[Diagnostic]) -> Vec<(&'static str, String)> {
        diags.iter().map(|d| (d.code, d.path.to_string())).collect()
    }

    #[test]
    fn minimal_valid_document_has_no_diagnostics() {
        assert_eq!(diags_for(MINIMAL), vec![]);
    }

    #[test]
    fn each_missing_required_field_is_reported_at_its_path() {
        for key in [
            "ospec_version",
            "id",
            "name",
            "description",
            "outcome_type",
            "acceptance",
            "stack",
        ] {
            let without: String = MINIMAL
                .lines()
                .scan(false, |skipping, line| {
                    let starts = line.starts_with(&format!("{}:", key));
                    let indented = line.starts_with(' ') || line.starts_with('-');
                    if starts {
                        *skipping = true;
                        Some(None)
                    } else if *skipping && indented {
                        Some(None)
                    } else {
                        *skipping = false;
                        Some(Some(line))
                    }
                })
                .flatten()
                .map(|l| format!("{}\n", l))
                .collect();

            let diags = diags_for(&without);
            assert!(
                diags
                    .iter()
                    .any(|d| d.code == codes::MISSING_REQUIRED_FIELD
                        && d.path.to_string() == key),
                "dropping {} should report missing_required_field at {}, got {:?}",
                key,
                key,
                diags
            );
        }
    }

    #[test]
    fn invalid_id_format() {
        let raw = MINIMAL.replace("id: sample", "id: Invalid_ID");
        let diags = diags_for(&raw);
        assert_eq!(
            codes_of(&diags),
            vec![(codes::INVALID_FORMAT, "id".to_string())]
        );
    }

    #[test]
    fn bad_enum_value_lists_alternatives() {
        let raw = MINIMAL.replace("outcome_type: api", "outcome_type: spaceship");
        let diags = diags_for(&raw);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::INVALID_ENUM_VALUE);
        assert!(diags[0].message.contains("web-app"));
    }

    #[test]
    fn coverage_above_one_is_out_of_range() {
        let raw = format!("{}guardrails:\n  min_test_coverage: 1.5\n", MINIMAL);
        let diags = diags_for(&raw);
        assert_eq!(
            codes_of(&diags),
            vec![(codes::OUT_OF_RANGE, "guardrails.min_test_coverage".to_string())]
        );
    }

    #[test]
    fn wrong_type_reports_mismatch_without_recursing() {
        let raw = MINIMAL.replace("stack:\n  backend: fastapi\n", "stack: fastapi\n");
        let diags = diags_for(&raw);
        assert_eq!(
            codes_of(&diags),
            vec![(codes::TYPE_MISMATCH, "stack".to_string())]
        );
        assert!(diags[0].message.contains("expected mapping"));
    }

    #[test]
    fn empty_stack_is_an_empty_collection() {
        let raw = MINIMAL.replace("stack:\n  backend: fastapi\n", "stack: {}\n");
        let diags = diags_for(&raw);
        assert_eq!(
            codes_of(&diags),
            vec![(codes::EMPTY_COLLECTION, "stack".to_string())]
        );
    }

    #[test]
    fn declared_but_empty_optional_sequence_is_flagged() {
        // Optional blocks may be omitted entirely, but once declared they
        // must carry at least one entry.
        let raw = format!("{}tasks: []\n", MINIMAL);
        let diags = diags_for(&raw);
        assert_eq!(
            codes_of(&diags),
            vec![(codes::EMPTY_COLLECTION, "tasks".to_string())]
        );
    }

    #[test]
    fn multiple_defects_surface_in_one_pass() {
        let raw = MINIMAL
            .replace("id: sample", "id: Invalid_ID")
            .replace("ospec_version: 1.0.0", "ospec_version: one-dot-oh");
        let diags = diags_for(&raw);
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.code == codes::INVALID_FORMAT));
    }

    #[test]
    fn unknown_fields_are_allowed() {
        let raw = format!("{}custom_extension:\n  anything: goes\n", MINIMAL);
        assert_eq!(diags_for(&raw), vec![]);
    }

    #[test]
    fn endpoint_status_is_range_checked() {
        let raw = MINIMAL.replace(
            "  tests:\n    - file: tests/api.test.ts\n",
            "  http_endpoints:\n    - path: /health\n      status: 707\n",
        );
        let diags = diags_for(&raw);
        assert_eq!(
            codes_of(&diags),
            vec![(
                codes::OUT_OF_RANGE,
                "acceptance.http_endpoints[0].status".to_string()
            )]
        );
    }

    #[test]
    fn diagnostics_carry_source_locations_for_block_nodes() {
        let raw = MINIMAL.replace("id: sample", "id: Invalid_ID");
        let diags = diags_for(&raw);
        let loc = diags[0].location.expect("id is a block-style key");
        assert_eq!(loc.line, 2);
    }
}
