//! SchemaNode constraint tree and the built-in OSpec v1 schema.
//!
//! A node constrains one position in the document: its type, plus whichever
//! of the optional constraints apply to that type. Constructors + chaining
//! keep the schema definition below readable.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Spec-format major versions this engine understands.
pub const SUPPORTED_MAJOR_VERSIONS: &[u64] = &[1];

/// Allowed `outcome_type` values.
pub const OUTCOME_TYPES: &[&str] = &[
    "web-app",
    "mobile-app",
    "api",
    "cli",
    "library",
    "agent",
    "infra",
    "game",
    "data",
    "other",
];

static KEBAB_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").unwrap());

static SEMVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)$").unwrap());

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Named string formats referenced by schema nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    KebabId,
    SemVer,
    Email,
}

impl Pattern {
    pub fn matches(self, s: &str) -> bool {
        match self {
            Pattern::KebabId => KEBAB_ID_RE.is_match(s),
            Pattern::SemVer => SEMVER_RE.is_match(s),
            Pattern::Email => EMAIL_RE.is_match(s),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Pattern::KebabId => "a kebab-case identifier ([a-z][a-z0-9-]*)",
            Pattern::SemVer => "a semantic version (major.minor.patch)",
            Pattern::Email => "an email address",
        }
    }
}

/// Parse the major component of a `major.minor.patch` version string.
pub fn semver_major(s: &str) -> Option<u64> {
    SEMVER_RE
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    String,
    Number,
    Bool,
    Sequence,
    Mapping,
}

impl SchemaType {
    pub fn label(self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Bool => "bool",
            SchemaType::Sequence => "sequence",
            SchemaType::Mapping => "mapping",
        }
    }
}

/// Declarative constraints for one document position.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub kind: SchemaType,
    /// Mapping: keys that must be present.
    pub required: Vec<&'static str>,
    /// Mapping: constraints for declared keys (unknown keys pass untouched).
    pub properties: BTreeMap<&'static str, SchemaNode>,
    /// Mapping: constraint applied to every value regardless of key.
    pub values: Option<Box<SchemaNode>>,
    /// Sequence: constraint for each item.
    pub items: Option<Box<SchemaNode>>,
    /// String: named format.
    pub pattern: Option<Pattern>,
    /// Scalar: allowed value set.
    pub allowed: Option<&'static [&'static str]>,
    /// Number: inclusive bounds.
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// String: inclusive length bounds.
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    /// Sequence or mapping: minimum entry count.
    pub min_items: Option<usize>,
}

impl SchemaNode {
    fn of(kind: SchemaType) -> Self {
        Self {
            kind,
            required: Vec::new(),
            properties: BTreeMap::new(),
            values: None,
            items: None,
            pattern: None,
            allowed: None,
            min: None,
            max: None,
            min_len: None,
            max_len: None,
            min_items: None,
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::of(SchemaType::Number)
    }

    pub fn boolean() -> Self {
        Self::of(SchemaType::Bool)
    }

    pub fn mapping() -> Self {
        Self::of(SchemaType::Mapping)
    }

    pub fn sequence(items: SchemaNode) -> Self {
        let mut node = Self::of(SchemaType::Sequence);
        node.items = Some(Box::new(items));
        node
    }

    pub fn required(mut self, keys: &[&'static str]) -> Self {
        self.required.extend_from_slice(keys);
        self
    }

    pub fn prop(mut self, key: &'static str, node: SchemaNode) -> Self {
        self.properties.insert(key, node);
        self
    }

    pub fn values(mut self, node: SchemaNode) -> Self {
        self.values = Some(Box::new(node));
        self
    }

    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn at_least(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn len(mut self, min: usize, max: Option<usize>) -> Self {
        self.min_len = Some(min);
        self.max_len = max;
        self
    }

    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = Some(n);
        self
    }
}

/// The built-in OSpec v1 schema.
///
/// Mirrors the document format: required identity fields, the acceptance
/// section, the stack mapping, and the optional guardrails/tasks/secrets/
/// scripts/prompts/metadata blocks.
pub fn ospec_schema() -> SchemaNode {
    SchemaNode::mapping()
        .required(&[
            "ospec_version",
            "id",
            "name",
            "description",
            "outcome_type",
            "acceptance",
            "stack",
        ])
        .prop("ospec_version", SchemaNode::string().pattern(Pattern::SemVer))
        .prop("id", SchemaNode::string().pattern(Pattern::KebabId))
        .prop("name", SchemaNode::string().len(1, Some(120)))
        .prop("description", SchemaNode::string().len(1, None))
        .prop("outcome_type", SchemaNode::string().one_of(OUTCOME_TYPES))
        .prop(
            "acceptance",
            SchemaNode::mapping()
                .prop(
                    "http_endpoints",
                    SchemaNode::sequence(
                        SchemaNode::mapping()
                            .required(&["path", "status"])
                            .prop("path", SchemaNode::string().len(1, None))
                            .prop("status", SchemaNode::number().range(100.0, 599.0))
                            .prop("method", SchemaNode::string()),
                    )
                    .min_items(1),
                )
                .prop(
                    "tests",
                    SchemaNode::sequence(
                        SchemaNode::mapping()
                            .required(&["file"])
                            .prop("file", SchemaNode::string().len(1, None)),
                    )
                    .min_items(1),
                )
                .prop(
                    "ux_flows",
                    SchemaNode::sequence(SchemaNode::string().len(1, None)).min_items(1),
                )
                .prop(
                    "performance",
                    SchemaNode::mapping().values(SchemaNode::number().at_least(0.0)),
                ),
        )
        .prop("stack", SchemaNode::mapping().min_items(1))
        .prop(
            "guardrails",
            SchemaNode::mapping()
                .prop("min_test_coverage", SchemaNode::number().range(0.0, 1.0))
                .prop("tests_required", SchemaNode::boolean())
                .prop("lint", SchemaNode::boolean()),
        )
        .prop(
            "tasks",
            SchemaNode::sequence(
                SchemaNode::mapping()
                    .required(&["id"])
                    .prop("id", SchemaNode::string().pattern(Pattern::KebabId))
                    .prop(
                        "depends_on",
                        SchemaNode::sequence(SchemaNode::string().len(1, None)),
                    )
                    .prop("estimate", SchemaNode::number().at_least(0.0)),
            )
            .min_items(1),
        )
        .prop(
            "secrets",
            SchemaNode::sequence(SchemaNode::string().len(1, None)).min_items(1),
        )
        .prop(
            "scripts",
            SchemaNode::sequence(
                SchemaNode::mapping()
                    .required(&["path"])
                    .prop("path", SchemaNode::string().len(1, None))
                    .prop("body", SchemaNode::string()),
            )
            .min_items(1),
        )
        .prop(
            "prompts",
            SchemaNode::sequence(SchemaNode::string().len(1, None)).min_items(1),
        )
        .prop(
            "metadata",
            SchemaNode::mapping()
                .prop("owner", SchemaNode::string())
                .prop("owner_email", SchemaNode::string().pattern(Pattern::Email)),
        )
}
