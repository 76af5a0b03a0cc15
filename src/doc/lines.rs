//! Best-effort field-path -> source-position index over raw YAML text.
//!
//! Built by a single indentation-aware scan at load time. Block-style keys
//! and sequence items are indexed; flow-style collections ("[a, b]") are not,
//! which is why Diagnostic.location stays optional.

use crate::diag::{FieldPath, Segment, SourceLocation};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^([A-Za-z0-9_][A-Za-z0-9_.-]*):(\s|$)"#).unwrap());

#[derive(Debug, Clone, Default)]
pub struct LineIndex(BTreeMap<String, SourceLocation>);

/// One open scope during the scan: a mapping key or a sequence position.
struct Frame {
    indent: usize,
    seg: Segment,
}

impl LineIndex {
    pub fn get(&self, path: &FieldPath) -> Option<SourceLocation> {
        self.0.get(&path.to_string()).copied()
    }

    pub fn build(raw: &str) -> Self {
        let mut map = BTreeMap::new();
        let mut frames: Vec<Frame> = Vec::new();

        for (lineno, line) in raw.lines().enumerate() {
            let lno = lineno + 1;
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "---" {
                continue;
            }

            let mut indent = line.len() - trimmed.len();
            let mut rest = trimmed;

            if rest == "-" || rest.starts_with("- ") {
                // Sequence item. Keep an existing sequence frame at this
                // indent (advance its index), otherwise open one at item 0.
                close_for_dash(&mut frames, indent);
                match frames.last_mut() {
                    Some(f) if f.indent == indent => {
                        if let Segment::Index(i) = f.seg {
                            f.seg = Segment::Index(i + 1);
                        }
                    }
                    _ => frames.push(Frame {
                        indent,
                        seg: Segment::Index(0),
                    }),
                }
                record(&mut map, &frames, lno, indent + 1);

                if rest == "-" {
                    continue;
                }
                // An inline "- key: ..." behaves like a key line nested two
                // columns past the dash.
                let after = &rest[2..];
                let pad = after.len() - after.trim_start().len();
                rest = after.trim_start();
                indent += 2 + pad;
            } else {
                // Plain key line closes every scope at or below this indent.
                frames.retain(|f| f.indent < indent);
            }

            if let Some(caps) = KEY_RE.captures(rest) {
                let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                frames.push(Frame {
                    indent,
                    seg: Segment::Key(key.to_string()),
                });
                record(&mut map, &frames, lno, indent + 1);
            }
        }

        Self(map)
    }
}

fn record(
    map: &mut BTreeMap<String, SourceLocation>,
    frames: &[Frame],
    line: usize,
    column: usize,
) {
    let path = FieldPath(frames.iter().map(|f| f.seg.clone()).collect());
    map.entry(path.to_string())
        .or_insert(SourceLocation { line, column });
}

/// Dash-line scope closing: drop everything deeper than the dash, and any
/// key opened at the dash's own indent, but keep a sequence frame there so
/// its index can advance.
fn close_for_dash(frames: &mut Vec<Frame>, indent: usize) {
    frames.retain(|f| {
        f.indent < indent || (f.indent == indent && matches!(f.seg, Segment::Index(_)))
    });
}
