//! Cross-file call graph: recursion and dead-code passes.
//!
//! Nodes are qualified function names stored in a flat arena; edges are
//! indices. Callees are resolved by name only: a bare callee `f` in package
//! `p` resolves to `p.f`, a qualified callee is looked up as written, and
//! anything that does not name a known function is ignored.

mod dead_code;
mod implements;
mod recursion;

pub use dead_code::reachable;
pub use implements::{infer_implements, MethodSets};
pub use recursion::{recursive_nodes, strongly_connected_components};

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::analysis::FunctionRecord;

/// Arena call graph over merged function records.
#[derive(Debug, Default)]
pub struct CallGraph {
    names: Vec<String>,
    index: HashMap<String, usize>,
    /// Record indices per node; more than one means a name collision.
    records: Vec<Vec<usize>>,
    /// Every resolvable caller -> callee edge.
    edges: Vec<Vec<usize>>,
    /// Edges from bare (same-package) callee names only.
    local_edges: Vec<Vec<usize>>,
}

impl CallGraph {
    /// Build the graph from merged records.
    pub fn build(functions: &[FunctionRecord]) -> Self {
        let mut graph = CallGraph::default();

        for (i, func) in functions.iter().enumerate() {
            let node = match graph.index.get(&func.qualified_name) {
                Some(&node) => {
                    warn!(
                        name = %func.qualified_name,
                        file = %func.file,
                        "qualified name collision; records share one graph node"
                    );
                    node
                }
                None => {
                    let node = graph.names.len();
                    graph.names.push(func.qualified_name.clone());
                    graph.index.insert(func.qualified_name.clone(), node);
                    graph.records.push(Vec::new());
                    node
                }
            };
            graph.records[node].push(i);
        }

        graph.edges = vec![Vec::new(); graph.names.len()];
        graph.local_edges = vec![Vec::new(); graph.names.len()];

        for func in functions {
            let caller = graph.index[&func.qualified_name];
            for callee in &func.callees {
                let bare = !callee.contains('.');
                let target = if bare {
                    graph.index.get(&format!("{}.{}", func.package, callee))
                } else {
                    graph.index.get(callee)
                };
                let Some(&target) = target else {
                    continue;
                };
                if !graph.edges[caller].contains(&target) {
                    graph.edges[caller].push(target);
                }
                if bare && !graph.local_edges[caller].contains(&target) {
                    graph.local_edges[caller].push(target);
                }
            }
        }

        debug!(
            nodes = graph.names.len(),
            edges = graph.edges.iter().map(Vec::len).sum::<usize>(),
            "call graph built"
        );
        graph
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Qualified names of the direct, resolved callees of `name`.
    pub fn callees_of(&self, name: &str) -> Vec<&str> {
        self.index
            .get(name)
            .map(|&node| {
                self.edges[node]
                    .iter()
                    .map(|&w| self.names[w].as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Set `is_recursive` on every record in a cycle or calling itself.
    pub fn mark_recursion(&self, functions: &mut [FunctionRecord]) {
        let flags = recursive_nodes(&self.edges);
        for (node, recursive) in flags.into_iter().enumerate() {
            for &i in &self.records[node] {
                functions[i].is_recursive = recursive;
            }
        }
    }

    /// Set `metrics.is_unused` on records unreachable from entry points
    /// and exported functions.
    ///
    /// An entry point matches either a qualified name or a bare function name.
    pub fn mark_unused(&self, functions: &mut [FunctionRecord], entry_points: &[String]) {
        let is_entry = |func: &FunctionRecord| {
            entry_points
                .iter()
                .any(|e| *e == func.qualified_name || *e == func.name)
        };

        let mut roots = vec![false; self.names.len()];
        for (node, records) in self.records.iter().enumerate() {
            roots[node] = records.iter().any(|&i| {
                let func = &functions[i];
                func.is_exported() || is_entry(func)
            });
        }

        let seeds = (0..self.names.len()).filter(|&node| roots[node]);
        let live = reachable(&self.local_edges, seeds);

        for (node, records) in self.records.iter().enumerate() {
            for &i in records {
                let func = &functions[i];
                let unused = !live[node] && !func.is_exported() && !is_entry(func);
                functions[i].metrics.is_unused = unused;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;

    fn func(package: &str, name: &str, callees: &[&str]) -> FunctionRecord {
        FunctionRecord {
            qualified_name: format!("{}.{}", package, name),
            callees: callees.iter().map(|c| c.to_string()).collect(),
            file: "main.go".to_string(),
            package: package.to_string(),
            params: Vec::new(),
            returns: Vec::new(),
            is_method: false,
            receiver_struct: String::new(),
            is_recursive: false,
            is_duplicate: false,
            cyclomatic_complexity: 1,
            lines_of_code: 1,
            referenced_globals: Vec::new(),
            dependencies: Vec::new(),
            metrics: Metrics::zeroed(),
            name: name.to_string(),
            line: 1,
            fingerprint: None,
        }
    }

    fn entry(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_mutual_recursion_cycle() {
        let mut funcs = vec![
            func("main", "a", &["b"]),
            func("main", "b", &["c"]),
            func("main", "c", &["a"]),
            func("main", "main", &["a", "fmt.Println"]),
        ];
        let graph = CallGraph::build(&funcs);
        graph.mark_recursion(&mut funcs);

        assert!(funcs[0].is_recursive);
        assert!(funcs[1].is_recursive);
        assert!(funcs[2].is_recursive);
        assert!(!funcs[3].is_recursive, "calling into a cycle is not recursion");
    }

    #[test]
    fn test_self_call_is_recursive() {
        let mut funcs = vec![func("math", "fact", &["fact"]), func("math", "id", &[])];
        let graph = CallGraph::build(&funcs);
        graph.mark_recursion(&mut funcs);
        assert!(funcs[0].is_recursive);
        assert!(!funcs[1].is_recursive);
    }

    #[test]
    fn test_qualified_self_call_is_recursive() {
        let mut funcs = vec![func("math", "fact", &["math.fact"])];
        let graph = CallGraph::build(&funcs);
        graph.mark_recursion(&mut funcs);
        assert!(funcs[0].is_recursive);
    }

    #[test]
    fn test_external_calls_are_ignored() {
        let mut funcs = vec![func("main", "main", &["fmt.Println", "log.Printf"])];
        let graph = CallGraph::build(&funcs);
        assert!(graph.callees_of("main.main").is_empty());
        graph.mark_recursion(&mut funcs);
        assert!(!funcs[0].is_recursive);
    }

    #[test]
    fn test_dead_code_from_entry_points() {
        let mut funcs = vec![
            func("main", "main", &["used"]),
            func("main", "used", &[]),
            func("main", "unused", &[]),
        ];
        let graph = CallGraph::build(&funcs);
        graph.mark_unused(&mut funcs, &entry(&["main"]));

        let unused: Vec<_> = funcs
            .iter()
            .filter(|f| f.metrics.is_unused)
            .map(|f| f.qualified_name.as_str())
            .collect();
        assert_eq!(unused, vec!["main.unused"]);
    }

    #[test]
    fn test_exported_never_unused() {
        let mut funcs = vec![
            func("api", "Handle", &["validate"]),
            func("api", "Orphan", &[]),
            func("api", "validate", &[]),
            func("api", "stale", &[]),
        ];
        let graph = CallGraph::build(&funcs);
        graph.mark_unused(&mut funcs, &entry(&["main"]));

        assert!(!funcs[0].metrics.is_unused);
        assert!(!funcs[1].metrics.is_unused);
        assert!(!funcs[2].metrics.is_unused, "reachable from an exported function");
        assert!(funcs[3].metrics.is_unused);
    }

    #[test]
    fn test_qualified_calls_do_not_propagate_reachability() {
        let mut funcs = vec![
            func("main", "main", &["main.helper"]),
            func("main", "helper", &[]),
        ];
        let graph = CallGraph::build(&funcs);
        graph.mark_unused(&mut funcs, &entry(&["main"]));
        assert!(funcs[1].metrics.is_unused);
    }

    #[test]
    fn test_entry_point_by_qualified_name() {
        let mut funcs = vec![func("worker", "start", &[]), func("worker", "stop", &[])];
        let graph = CallGraph::build(&funcs);
        graph.mark_unused(&mut funcs, &entry(&["worker.start"]));
        assert!(!funcs[0].metrics.is_unused);
        assert!(funcs[1].metrics.is_unused);
    }

    #[test]
    fn test_name_collision_shares_node() {
        let mut funcs = vec![
            func("main", "init", &[]),
            func("main", "init", &["init"]),
        ];
        let graph = CallGraph::build(&funcs);
        assert_eq!(graph.len(), 1);
        graph.mark_recursion(&mut funcs);
        assert!(funcs.iter().all(|f| f.is_recursive));
    }
}
