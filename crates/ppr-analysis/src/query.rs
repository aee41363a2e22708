//! Read-only queries over a built product-line graph.

use crate::error::AnalysisError;
use crate::graph::DirectedGraph;
use ppr_core::model::{Edge, Node};
use std::collections::VecDeque;

pub fn node_count(graph: &DirectedGraph) -> usize {
    graph.node_count()
}

pub fn edge_count(graph: &DirectedGraph) -> usize {
    graph.edge_count()
}

/// Full node record of a vertex.
pub fn node_detail<'g>(graph: &'g DirectedGraph, name: &str) -> Result<&'g Node, AnalysisError> {
    let v = graph.require(name)?;
    Ok(graph.vertex(v))
}

/// The first arc `source -> target`, if any.
pub fn edge_detail<'g>(graph: &'g DirectedGraph, source: &str, target: &str) -> Option<&'g Edge> {
    edges_between(graph, source, target).into_iter().next()
}

/// Every arc `source -> target`, in edge-collection order.
pub fn edges_between<'g>(graph: &'g DirectedGraph, source: &str, target: &str) -> Vec<&'g Edge> {
    let (Some(from), Some(to)) = (graph.index_of(source), graph.index_of(target)) else {
        return Vec::new();
    };
    graph
        .out_arcs(from)
        .iter()
        .map(|&a| graph.arc(a))
        .filter(|arc| arc.to == to)
        .map(|arc| &arc.edge)
        .collect()
}

/// Directed density `|E| / (|V| * (|V| - 1))`, 0 for graphs with at most one vertex.
/// Parallel arcs and self-loops count toward `|E|`.
pub fn density(graph: &DirectedGraph) -> f64 {
    let n = graph.node_count();
    if n <= 1 {
        return 0.0;
    }
    graph.edge_count() as f64 / (n * (n - 1)) as f64
}

pub fn is_empty(graph: &DirectedGraph) -> bool {
    graph.node_count() == 0
}

/// Product-line graphs are always built directed.
pub fn is_directed(_graph: &DirectedGraph) -> bool {
    true
}

/// Whether `to` is reachable from `from` along arc direction.
pub fn has_path(graph: &DirectedGraph, from: &str, to: &str) -> Result<bool, AnalysisError> {
    let source = graph.require(from)?;
    let target = graph.require(to)?;
    Ok(bfs(graph, source, target).is_some())
}

/// Fewest-arc path from `from` to `to` as an ordered list of node names.
/// `shortest_path(g, a, a)` is `[a]`.
pub fn shortest_path(
    graph: &DirectedGraph,
    from: &str,
    to: &str,
) -> Result<Vec<String>, AnalysisError> {
    let source = graph.require(from)?;
    let target = graph.require(to)?;
    let path = bfs(graph, source, target).ok_or_else(|| AnalysisError::NoPath {
        from: from.to_string(),
        to: to.to_string(),
    })?;
    Ok(path
        .into_iter()
        .map(|v| graph.name_of(v).to_string())
        .collect())
}

/// Breadth-first search returning the vertex sequence of a shortest path.
fn bfs(graph: &DirectedGraph, source: usize, target: usize) -> Option<Vec<usize>> {
    if source == target {
        return Some(vec![source]);
    }

    let mut parent: Vec<Option<usize>> = vec![None; graph.node_count()];
    let mut visited = vec![false; graph.node_count()];
    let mut queue = VecDeque::new();
    visited[source] = true;
    queue.push_back(source);

    while let Some(current) = queue.pop_front() {
        for &a in graph.out_arcs(current) {
            let next = graph.arc(a).to;
            if visited[next] {
                continue;
            }
            visited[next] = true;
            parent[next] = Some(current);
            if next == target {
                let mut path = vec![target];
                let mut cursor = current;
                path.push(cursor);
                while let Some(p) = parent[cursor] {
                    path.push(p);
                    cursor = p;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(next);
        }
    }

    None
}
