//! SpecDocument: the loaded document tree plus access helpers.

use crate::diag::{FieldPath, SourceLocation};
use crate::doc::LineIndex;
use serde_yaml::{Mapping, Sequence, Value};
use std::path::{Path, PathBuf};

/// One loaded OSpec document. Immutable after load; owned by the pipeline
/// invocation that created it.
#[derive(Debug, Clone)]
pub struct SpecDocument {
    /// Path the document was loaded from (also its report identifier).
    pub file: PathBuf,
    /// Root mapping of the document.
    pub root: Mapping,
    /// Best-effort path -> source position index.
    pub lines: LineIndex,
}

impl SpecDocument {
    /// Directory that relative file references resolve against.
    pub fn base_dir(&self) -> &Path {
        self.file.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn location(&self, path: &FieldPath) -> Option<SourceLocation> {
        self.lines.get(path)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        field(&self.root, key)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    pub fn seq_field(&self, key: &str) -> Option<&Sequence> {
        self.field(key).and_then(Value::as_sequence)
    }

    pub fn map_field(&self, key: &str) -> Option<&Mapping> {
        self.field(key).and_then(Value::as_mapping)
    }
}

/// Look up a string key in a YAML mapping.
pub fn field<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(k, _)| k.as_str() == Some(key))
        .map(|(_, v)| v)
}

/// Human label for a YAML value's shape, used in type mismatch messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
