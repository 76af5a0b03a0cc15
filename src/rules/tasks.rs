//! Task dependency graph well-formedness.
//!
//! Derives a transient id -> depends_on view from the `tasks` field, then
//! checks: unique ids, every dependency resolves to a declared id, and the
//! relation is acyclic. Cycle detection is a DFS carrying an explicit
//! recursion stack; each distinct cycle is reported once (canonicalized by
//! rotating the smallest member to the front), not once per node.

use crate::diag::{codes, Diagnostic, FieldPath};
use crate::doc::value::field;
use crate::doc::SpecDocument;
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Transient semantic-layer view of one task entry.
struct TaskNode {
    /// Position in the `tasks` sequence, for path reporting.
    index: usize,
    depends_on: Vec<String>,
}

pub fn dependency_graph(doc: &SpecDocument) -> Vec<Diagnostic> {
    let Some(items) = doc.seq_field("tasks") else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let tasks_path = FieldPath::of("tasks");

    // 1) Collect declared tasks; duplicate ids are reported here because the
    //    per-item schema cannot see across items.
    let mut nodes: BTreeMap<String, TaskNode> = BTreeMap::new();
    for (i, item) in items.iter().enumerate() {
        let Some(map) = item.as_mapping() else {
            continue;
        };
        let Some(id) = field(map, "id").and_then(Value::as_str) else {
            continue;
        };

        let depends_on: Vec<String> = field(map, "depends_on")
            .and_then(Value::as_sequence)
            .map(|deps| {
                deps.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if nodes.contains_key(id) {
            let path = tasks_path.index(i).key("id");
            let location = doc.location(&path);
            out.push(
                Diagnostic::error(
                    codes::DUPLICATE_TASK_ID,
                    path,
                    format!("task id '{}' is declared more than once", id),
                )
                .at(location),
            );
            continue;
        }
        nodes.insert(id.to_string(), TaskNode { index: i, depends_on });
    }

    // 2) Every depends_on entry must name a declared task.
    for (id, node) in &nodes {
        for (j, dep) in node.depends_on.iter().enumerate() {
            if !nodes.contains_key(dep) {
                let path = tasks_path.index(node.index).key("depends_on").index(j);
                let location = doc.location(&path);
                out.push(
                    Diagnostic::error(
                        codes::UNKNOWN_DEPENDENCY,
                        path,
                        format!("task '{}' depends on unknown task '{}'", id, dep),
                    )
                    .at(location),
                );
            }
        }
    }

    // 3) Cycle detection.
    for cycle in find_cycles(&nodes) {
        let location = doc.location(&tasks_path);
        out.push(
            Diagnostic::error(
                codes::CIRCULAR_DEPENDENCY,
                tasks_path.clone(),
                format!("circular dependency: {}", render_cycle(&cycle)),
            )
            .at(location),
        );
    }

    out
}

fn render_cycle(cycle: &[String]) -> String {
    let mut chain = cycle.join(" -> ");
    chain.push_str(" -> ");
    chain.push_str(&cycle[0]);
    chain
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Temp,
    Perm,
}

/// Depth-first search over the dependency edges; a node revisited while
/// still on the recursion stack closes a cycle. Cycles are canonicalized so
/// the same loop entered from different start nodes is counted once.
fn find_cycles(nodes: &BTreeMap<String, TaskNode>) -> Vec<Vec<String>> {
    fn dfs(
        v: &str,
        nodes: &BTreeMap<String, TaskNode>,
        marks: &mut BTreeMap<String, Mark>,
        stack: &mut Vec<String>,
        cycles: &mut BTreeSet<Vec<String>>,
    ) {
        match marks.get(v) {
            Some(Mark::Perm) => return,
            Some(Mark::Temp) => {
                if let Some(start) = stack.iter().position(|s| s == v) {
                    cycles.insert(canonicalize(&stack[start..]));
                }
                return;
            }
            None => {}
        }

        marks.insert(v.to_string(), Mark::Temp);
        stack.push(v.to_string());

        if let Some(node) = nodes.get(v) {
            for dep in &node.depends_on {
                // Unresolved deps are step 2's finding; skip them here.
                if nodes.contains_key(dep) {
                    dfs(dep, nodes, marks, stack, cycles);
                }
            }
        }

        stack.pop();
        marks.insert(v.to_string(), Mark::Perm);
    }

    let mut marks = BTreeMap::new();
    let mut cycles = BTreeSet::new();
    for id in nodes.keys() {
        let mut stack = Vec::new();
        dfs(id, nodes, &mut marks, &mut stack, &mut cycles);
    }
    cycles.into_iter().collect()
}

/// Rotate the cycle so its smallest member comes first.
fn canonicalize(cycle: &[String]) -> Vec<String> {
    let min = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, s)| s.as_str())
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut rotated = Vec::with_capacity(cycle.len());
    rotated.extend_from_slice(&cycle[min..]);
    rotated.extend_from_slice(&cycle[..min]);
    rotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::doc;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_tasks_field_is_a_no_op() {
        assert_eq!(dependency_graph(&doc("id: sample\n")), vec![]);
    }

    #[test]
    fn well_formed_graph_is_clean() {
        let d = doc("tasks:\n  - id: a\n  - id: b\n    depends_on:\n      - a\n");
        assert_eq!(dependency_graph(&d), vec![]);
    }

    #[test]
    fn unknown_dependency_names_the_missing_id() {
        let d = doc("tasks:\n  - id: a\n    depends_on:\n      - ghost\n");
        let diags = dependency_graph(&d);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::UNKNOWN_DEPENDENCY);
        assert_eq!(diags[0].path.to_string(), "tasks[0].depends_on[0]");
        assert!(diags[0].message.contains("'ghost'"));
    }

    #[test]
    fn two_task_cycle_is_reported_once() {
        let d = doc(
            "tasks:\n  - id: a\n    depends_on:\n      - b\n  - id: b\n    depends_on:\n      - a\n",
        );
        let diags = dependency_graph(&d);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::CIRCULAR_DEPENDENCY);
        assert_eq!(diags[0].message, "circular dependency: a -> b -> a");
    }

    #[test]
    fn distinct_cycles_are_each_reported() {
        let d = doc(
            "tasks:\n\
             \x20 - id: a\n\
             \x20   depends_on: [b]\n\
             \x20 - id: b\n\
             \x20   depends_on: [a]\n\
             \x20 - id: c\n\
             \x20   depends_on: [d]\n\
             \x20 - id: d\n\
             \x20   depends_on: [c]\n",
        );
        let diags = dependency_graph(&d);
        let cycles: Vec<&str> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            cycles,
            vec![
                "circular dependency: a -> b -> a",
                "circular dependency: c -> d -> c",
            ]
        );
    }

    #[test]
    fn duplicate_task_ids_are_errors() {
        let d = doc("tasks:\n  - id: a\n  - id: a\n");
        let diags = dependency_graph(&d);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::DUPLICATE_TASK_ID);
        assert_eq!(diags[0].path.to_string(), "tasks[1].id");
    }

    #[test]
    fn longer_cycle_is_one_diagnostic_not_one_per_node() {
        let d = doc(
            "tasks:\n\
             \x20 - id: a\n\
             \x20   depends_on: [b]\n\
             \x20 - id: b\n\
             \x20   depends_on: [c]\n\
             \x20 - id: c\n\
             \x20   depends_on: [a]\n",
        );
        let diags = dependency_graph(&d);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "circular dependency: a -> b -> c -> a");
    }
}
