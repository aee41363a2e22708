//! Strongly connected components and recurring linear structures.
//!
//! The two analyses answer different questions: components find groups of
//! mutually reachable nodes (cycles in the flow), recurring components list the
//! maximal simple chains a depth-first walk from one start node produces.

use crate::error::AnalysisError;
use crate::graph::DirectedGraph;
use std::collections::BTreeSet;

/// Maximal sets of mutually reachable nodes, iterative Tarjan.
///
/// Every vertex belongs to exactly one component; an isolated vertex forms a
/// singleton. Components are returned sorted for stable output.
pub fn strongly_connected_components(graph: &DirectedGraph) -> Vec<BTreeSet<String>> {
    let n = graph.node_count();
    let mut next_index = 0usize;
    let mut index: Vec<Option<usize>> = vec![None; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut components: Vec<BTreeSet<String>> = Vec::new();

    for root in 0..n {
        if index[root].is_some() {
            continue;
        }

        // (vertex, position in its outgoing arc list)
        let mut call: Vec<(usize, usize)> = vec![(root, 0)];
        index[root] = Some(next_index);
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;

        while let Some(frame) = call.last_mut() {
            let v = frame.0;
            let arcs = graph.out_arcs(v);
            if frame.1 < arcs.len() {
                let w = graph.arc(arcs[frame.1]).to;
                frame.1 += 1;
                match index[w] {
                    None => {
                        index[w] = Some(next_index);
                        lowlink[w] = next_index;
                        next_index += 1;
                        stack.push(w);
                        on_stack[w] = true;
                        call.push((w, 0));
                    }
                    Some(w_index) if on_stack[w] => {
                        lowlink[v] = lowlink[v].min(w_index);
                    }
                    Some(_) => {}
                }
                continue;
            }

            call.pop();
            if let Some(&(parent, _)) = call.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }
            if Some(lowlink[v]) == index[v] {
                let mut component = BTreeSet::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component.insert(graph.name_of(w).to_string());
                    if w == v {
                        break;
                    }
                }
                components.push(component);
            }
        }
    }

    components.sort();
    tracing::debug!(
        line = %graph.line(),
        components = components.len(),
        "computed strongly connected components"
    );
    components
}

/// DFS frame: vertex, position in its outgoing arcs, and whether it pushed a child.
struct Frame {
    vertex: usize,
    cursor: usize,
    descended: bool,
}

/// Maximal simple paths from `start` found by one depth-first traversal.
///
/// Each node is visited at most once. A path is recorded when the walk
/// backtracks from a node that had no unvisited successor to descend into,
/// and only when it spans more than one node. Sequences are kept in order and
/// deduplicated exactly.
///
/// Only maximal chains are reported: `A -> B -> C` yields `(A, B, C)` and not
/// its prefix `(A, B)`.
pub fn recurring_components(
    graph: &DirectedGraph,
    start: &str,
) -> Result<BTreeSet<Vec<String>>, AnalysisError> {
    let mut found = BTreeSet::new();
    recurring_components_into(graph, start, &mut found)?;
    Ok(found)
}

/// Same traversal as [`recurring_components`], adding into a caller-owned set.
/// Returns how many new sequences were added.
pub fn recurring_components_into(
    graph: &DirectedGraph,
    start: &str,
    found: &mut BTreeSet<Vec<String>>,
) -> Result<usize, AnalysisError> {
    let root = graph.require(start)?;
    let before = found.len();

    let mut visited = vec![false; graph.node_count()];
    visited[root] = true;

    let mut stack = vec![Frame {
        vertex: root,
        cursor: 0,
        descended: false,
    }];

    while let Some(frame) = stack.last_mut() {
        let arcs = graph.out_arcs(frame.vertex);
        if frame.cursor < arcs.len() {
            let next = graph.arc(arcs[frame.cursor]).to;
            frame.cursor += 1;
            if !visited[next] {
                visited[next] = true;
                frame.descended = true;
                stack.push(Frame {
                    vertex: next,
                    cursor: 0,
                    descended: false,
                });
            }
            continue;
        }

        if !frame.descended && stack.len() > 1 {
            found.insert(
                stack
                    .iter()
                    .map(|f| graph.name_of(f.vertex).to_string())
                    .collect(),
            );
        }
        stack.pop();
    }

    let added = found.len() - before;
    tracing::debug!(start, added, "collected recurring components");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build;
    use ppr_core::config::IntegrityMode;
    use ppr_core::model::{Edge, Node, NodeType, ProductLine, RelationKind};

    fn graph(names: &[&str], arcs: &[(&str, &str)]) -> DirectedGraph {
        let nodes: Vec<Node> = names
            .iter()
            .map(|n| Node::new(*n, NodeType::Process))
            .collect();
        let edges: Vec<Edge> = arcs
            .iter()
            .map(|(s, t)| Edge::new(*s, RelationKind::ConnectedTo, *t))
            .collect();
        build(&nodes, &edges, ProductLine::One, IntegrityMode::Strict).unwrap()
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn seq(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_scc_acyclic_graph_is_all_singletons() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let sccs = strongly_connected_components(&g);
        assert_eq!(sccs, vec![set(&["a"]), set(&["b"]), set(&["c"])]);
    }

    #[test]
    fn test_scc_finds_cycle() {
        let g = graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")],
        );
        let sccs = strongly_connected_components(&g);
        assert_eq!(sccs, vec![set(&["a", "b", "c"]), set(&["d"])]);
    }

    #[test]
    fn test_scc_partitions_vertices() {
        let g = graph(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "a"), ("c", "d"), ("d", "e"), ("e", "c"), ("b", "c")],
        );
        let sccs = strongly_connected_components(&g);
        let total: usize = sccs.iter().map(|c| c.len()).sum();
        assert_eq!(total, 5);
        assert_eq!(sccs.len(), 2);
    }

    #[test]
    fn test_scc_empty_graph() {
        assert!(strongly_connected_components(&graph(&[], &[])).is_empty());
    }

    #[test]
    fn test_recurring_chain() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let found = recurring_components(&g, "A").unwrap();
        assert_eq!(found, BTreeSet::from([seq(&["A", "B", "C"])]));
        assert!(!found.contains(&seq(&["A", "B"])));
    }

    #[test]
    fn test_recurring_branches() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("A", "C")]);
        let found = recurring_components(&g, "A").unwrap();
        assert_eq!(found, BTreeSet::from([seq(&["A", "B"]), seq(&["A", "C"])]));
    }

    #[test]
    fn test_recurring_visits_each_node_once() {
        // Diamond: D is reached through B first and never re-entered through C.
        let g = graph(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
        );
        let found = recurring_components(&g, "A").unwrap();
        assert_eq!(
            found,
            BTreeSet::from([seq(&["A", "B", "D"]), seq(&["A", "C"])])
        );
    }

    #[test]
    fn test_recurring_cycle_terminates() {
        let g = graph(&["A", "B"], &[("A", "B"), ("B", "A")]);
        let found = recurring_components(&g, "A").unwrap();
        assert_eq!(found, BTreeSet::from([seq(&["A", "B"])]));
    }

    #[test]
    fn test_recurring_isolated_start_is_empty() {
        let g = graph(&["A", "B"], &[("B", "A")]);
        assert!(recurring_components(&g, "A").unwrap().is_empty());
    }

    #[test]
    fn test_recurring_unknown_start() {
        let g = graph(&["A"], &[]);
        assert!(matches!(
            recurring_components(&g, "Z"),
            Err(AnalysisError::NotFound { .. })
        ));
    }

    #[test]
    fn test_recurring_into_accumulates() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("C", "B")]);
        let mut found = BTreeSet::new();
        assert_eq!(recurring_components_into(&g, "A", &mut found).unwrap(), 1);
        assert_eq!(recurring_components_into(&g, "C", &mut found).unwrap(), 1);
        assert_eq!(recurring_components_into(&g, "A", &mut found).unwrap(), 0);
        assert_eq!(found.len(), 2);
    }
}
