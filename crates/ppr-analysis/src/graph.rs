//! Directed multigraph materialized from an entity store for one product line.
//!
//! Graphs are rebuilt from scratch for every analysis; there is no incremental
//! update path, so a built graph always reflects the store it was built from.

use crate::error::AnalysisError;
use ppr_core::config::IntegrityMode;
use ppr_core::model::{Edge, Node, ProductLine};
use ppr_core::store::EntityStore;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// A directed arc between two vertex indices carrying its edge record.
#[derive(Debug, Clone)]
pub(crate) struct Arc {
    pub(crate) from: usize,
    pub(crate) to: usize,
    pub(crate) edge: Edge,
}

/// Directed multigraph over one product line. Vertices are keyed by node name
/// and carry the full node record; arcs carry the edge record.
#[derive(Debug, Clone)]
pub struct DirectedGraph {
    line: ProductLine,
    vertices: Vec<Node>,
    index: HashMap<String, usize>,
    arcs: Vec<Arc>,
    /// Outgoing arc indices per vertex, in edge-collection order.
    out: Vec<Vec<usize>>,
    /// Edges left out of a lenient build because an endpoint was missing.
    skipped: Vec<Edge>,
}

impl DirectedGraph {
    fn empty(line: ProductLine) -> Self {
        Self {
            line,
            vertices: Vec::new(),
            index: HashMap::new(),
            arcs: Vec::new(),
            out: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn line(&self) -> ProductLine {
        self.line
    }

    pub fn node_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.arcs.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&i| &self.vertices[i])
    }

    /// Vertices in node-list order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.vertices.iter()
    }

    /// Arcs in edge-collection order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.arcs.iter().map(|a| &a.edge)
    }

    /// Names of the direct successors of `name` (one entry per arc).
    pub fn successors(&self, name: &str) -> Vec<&str> {
        match self.index.get(name) {
            Some(&v) => self.out[v]
                .iter()
                .map(|&a| self.vertices[self.arcs[a].to].name.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Edges that a lenient build dropped.
    pub fn skipped(&self) -> &[Edge] {
        &self.skipped
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn vertex(&self, v: usize) -> &Node {
        &self.vertices[v]
    }

    pub(crate) fn name_of(&self, v: usize) -> &str {
        &self.vertices[v].name
    }

    pub(crate) fn out_arcs(&self, v: usize) -> &[usize] {
        &self.out[v]
    }

    pub(crate) fn arc(&self, a: usize) -> &Arc {
        &self.arcs[a]
    }

    /// Resolve a name or report it as missing from this line's graph.
    pub(crate) fn require(&self, name: &str) -> Result<usize, AnalysisError> {
        self.index_of(name).ok_or_else(|| AnalysisError::NotFound {
            line: self.line,
            name: name.to_string(),
        })
    }
}

/// Build the graph of `line` from a node set and that line's edge collection.
///
/// Only nodes admitted by the line become vertices. An edge whose endpoint is
/// not a vertex fails the build in [`IntegrityMode::Strict`] and is logged and
/// skipped in [`IntegrityMode::Lenient`]; no bare vertex is ever created for it.
pub fn build(
    nodes: &[Node],
    edges: &[Edge],
    line: ProductLine,
    mode: IntegrityMode,
) -> Result<DirectedGraph, AnalysisError> {
    let mut graph = DirectedGraph::empty(line);

    for node in nodes.iter().filter(|n| line.admits(n.node_type)) {
        if graph.index.contains_key(&node.name) {
            return Err(AnalysisError::DuplicateNode {
                line,
                name: node.name.clone(),
            });
        }
        graph.index.insert(node.name.clone(), graph.vertices.len());
        graph.vertices.push(node.clone());
        graph.out.push(Vec::new());
    }

    for edge in edges {
        let from = graph.index.get(&edge.source).copied();
        let to = graph.index.get(&edge.target).copied();
        match (from, to) {
            (Some(from), Some(to)) => {
                graph.out[from].push(graph.arcs.len());
                graph.arcs.push(Arc {
                    from,
                    to,
                    edge: edge.clone(),
                });
            }
            _ => {
                let missing = if from.is_none() {
                    &edge.source
                } else {
                    &edge.target
                };
                match mode {
                    IntegrityMode::Strict => {
                        return Err(AnalysisError::Integrity {
                            line,
                            edge: edge.id,
                            missing: missing.clone(),
                        });
                    }
                    IntegrityMode::Lenient => {
                        tracing::warn!(
                            %line,
                            edge = %edge.id,
                            missing = missing.as_str(),
                            "skipping relation with a dangling endpoint"
                        );
                        graph.skipped.push(edge.clone());
                    }
                }
            }
        }
    }

    tracing::debug!(
        %line,
        vertices = graph.vertices.len(),
        arcs = graph.arcs.len(),
        skipped = graph.skipped.len(),
        "built product-line graph"
    );
    Ok(graph)
}

/// Build `line`'s graph from the current contents of a store.
pub fn build_from_store(
    store: &EntityStore,
    line: ProductLine,
    mode: IntegrityMode,
) -> Result<DirectedGraph, AnalysisError> {
    build(store.nodes(), store.edges(line), line, mode)
}

/// An edge whose endpoints are not both nodes of its product line.
#[derive(Debug, Clone, Serialize)]
pub struct DanglingEdge {
    pub id: Uuid,
    pub source: String,
    pub target: String,
    /// Endpoint names that do not resolve to a node of the line.
    pub missing: Vec<String>,
}

/// Integrity findings for one product line, computed without failing.
#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub line: ProductLine,
    pub dangling: Vec<DanglingEdge>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty()
    }
}

/// List every edge of `line` that a strict build would reject.
pub fn integrity_report(store: &EntityStore, line: ProductLine) -> IntegrityReport {
    let resolves = |name: &str| store.node(name).is_some_and(|n| line.admits(n.node_type));

    let dangling = store
        .edges(line)
        .iter()
        .filter_map(|edge| {
            let missing: Vec<String> = [&edge.source, &edge.target]
                .into_iter()
                .filter(|name| !resolves(name.as_str()))
                .cloned()
                .collect();
            if missing.is_empty() {
                None
            } else {
                Some(DanglingEdge {
                    id: edge.id,
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    missing,
                })
            }
        })
        .collect();

    IntegrityReport { line, dangling }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppr_core::model::{NodeType, RelationKind};

    fn nodes() -> Vec<Node> {
        vec![
            Node::new("P1", NodeType::Product1),
            Node::new("P2", NodeType::Product2),
            Node::new("Cut", NodeType::Process),
            Node::new("Saw", NodeType::Resource),
        ]
    }

    #[test]
    fn test_build_filters_vertices_by_line() {
        let g = build(&nodes(), &[], ProductLine::One, IntegrityMode::Strict).unwrap();
        assert_eq!(g.node_count(), 3);
        assert!(g.contains("P1"));
        assert!(!g.contains("P2"));

        let g = build(&nodes(), &[], ProductLine::Two, IntegrityMode::Strict).unwrap();
        assert!(g.contains("P2"));
        assert!(!g.contains("P1"));
    }

    #[test]
    fn test_build_keeps_parallel_arcs() {
        let edges = vec![
            Edge::new("Cut", RelationKind::ExecutedBy, "Saw"),
            Edge::new("Cut", RelationKind::ConnectedTo, "Saw"),
        ];
        let g = build(&nodes(), &edges, ProductLine::One, IntegrityMode::Strict).unwrap();
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.successors("Cut"), vec!["Saw", "Saw"]);
    }

    #[test]
    fn test_strict_build_rejects_dangling_edge() {
        let edges = vec![Edge::new("Cut", RelationKind::ExecutedBy, "Ghost")];
        let err = build(&nodes(), &edges, ProductLine::One, IntegrityMode::Strict).unwrap_err();
        match err {
            AnalysisError::Integrity { missing, .. } => assert_eq!(missing, "Ghost"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_edge_to_other_lines_product_is_dangling() {
        let edges = vec![Edge::new("P2", RelationKind::InputFor, "Cut")];
        let err = build(&nodes(), &edges, ProductLine::One, IntegrityMode::Strict).unwrap_err();
        assert!(matches!(err, AnalysisError::Integrity { .. }));
    }

    #[test]
    fn test_lenient_build_skips_without_creating_vertices() {
        let edges = vec![
            Edge::new("Ghost", RelationKind::InputFor, "Cut"),
            Edge::new("Cut", RelationKind::ExecutedBy, "Saw"),
        ];
        let g = build(&nodes(), &edges, ProductLine::One, IntegrityMode::Lenient).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.skipped().len(), 1);
        assert!(!g.contains("Ghost"));
    }

    #[test]
    fn test_duplicate_vertex_rejected() {
        let mut nodes = nodes();
        nodes.push(Node::new("Cut", NodeType::Resource));
        let err = build(&nodes, &[], ProductLine::One, IntegrityMode::Lenient).unwrap_err();
        assert!(matches!(err, AnalysisError::DuplicateNode { .. }));
    }

    #[test]
    fn test_integrity_report_lists_missing_endpoints() {
        let store = EntityStore::from_parts(
            nodes(),
            vec![
                Edge::new("Cut", RelationKind::ExecutedBy, "Saw"),
                Edge::new("Old name", RelationKind::InputFor, "P2"),
            ],
            Vec::new(),
        );
        let report = integrity_report(&store, ProductLine::One);
        assert!(!report.is_clean());
        assert_eq!(report.dangling.len(), 1);
        assert_eq!(report.dangling[0].missing, vec!["Old name", "P2"]);
        assert!(integrity_report(&store, ProductLine::Two).is_clean());
    }
}
