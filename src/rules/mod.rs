//! Semantic rule engine: cross-field checks on schema-valid documents.
//!
//! The rule set is small and closed, so it is a fixed list of pure functions
//! rather than a registry. Each rule is independent and order-insensitive
//! (the aggregator sorts for display), and defensively no-ops when its input
//! field is absent or has the wrong shape, because the schema validator has
//! already reported that once.

pub mod files;
pub mod meta;
pub mod tasks;

use crate::diag::Diagnostic;
use crate::doc::SpecDocument;

type Rule = fn(&SpecDocument) -> Vec<Diagnostic>;

const RULES: &[Rule] = &[
    tasks::dependency_graph,
    files::referenced_files,
    meta::id_matches_filename,
    meta::acceptance_criteria,
    meta::spec_version_supported,
    meta::secret_names,
];

/// Run every semantic rule over the document.
pub fn evaluate(doc: &SpecDocument) -> Vec<Diagnostic> {
    RULES.iter().flat_map(|rule| rule(doc)).collect()
}
