//! Utilization ratios and targeted reachability between node roles.

use crate::error::AnalysisError;
use crate::graph::DirectedGraph;
use crate::query::shortest_path;
use ppr_core::model::{Edge, Node, NodeType, ProductLine};
use ppr_core::store::EntityStore;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Node type whose usage is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UtilizationTarget {
    Resource,
    Process,
}

impl UtilizationTarget {
    pub fn node_type(self) -> NodeType {
        match self {
            UtilizationTarget::Resource => NodeType::Resource,
            UtilizationTarget::Process => NodeType::Process,
        }
    }
}

impl fmt::Display for UtilizationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.node_type().label())
    }
}

impl FromStr for UtilizationTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "resource" | "resources" => Ok(UtilizationTarget::Resource),
            "process" | "processes" => Ok(UtilizationTarget::Process),
            other => Err(format!(
                "unknown utilization target '{}' (expected resource or process)",
                other
            )),
        }
    }
}

/// Share of `target`-typed nodes referenced by a product line's relations.
#[derive(Debug, Clone, Serialize)]
pub struct UtilizationReport {
    pub line: ProductLine,
    pub target: UtilizationTarget,
    pub total: usize,
    pub used: usize,
    /// Distinct used names, sorted.
    pub used_names: Vec<String>,
    /// Nodes of the target type that no relation references, in node-list order.
    pub unused: Vec<String>,
    /// `used / total`, or 0 when there are no nodes of the target type.
    pub ratio: f64,
    pub percentage: f64,
}

/// Compute utilization of `target` nodes over one line's edge collection.
///
/// A node counts once no matter how many relations reference it, and only
/// names that belong to a node of the target type are counted.
pub fn utilization(
    nodes: &[Node],
    edges: &[Edge],
    line: ProductLine,
    target: UtilizationTarget,
) -> UtilizationReport {
    let node_type = target.node_type();
    let candidates: Vec<&str> = nodes
        .iter()
        .filter(|n| n.node_type == node_type)
        .map(|n| n.name.as_str())
        .collect();
    let typed: BTreeSet<&str> = candidates.iter().copied().collect();

    let used: BTreeSet<&str> = edges
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .filter(|name| typed.contains(name))
        .collect();

    let unused: Vec<String> = candidates
        .iter()
        .filter(|name| !used.contains(*name))
        .map(|name| (*name).to_string())
        .collect();

    // Distinct names so duplicated node records never push the ratio past 1.
    let total = typed.len();
    let ratio = if total == 0 {
        0.0
    } else {
        used.len() as f64 / total as f64
    };

    UtilizationReport {
        line,
        target,
        total,
        used: used.len(),
        used_names: used.iter().map(|s| (*s).to_string()).collect(),
        unused,
        ratio,
        percentage: ratio * 100.0,
    }
}

/// [`utilization`] over the current contents of a store.
pub fn utilization_for(
    store: &EntityStore,
    line: ProductLine,
    target: UtilizationTarget,
) -> UtilizationReport {
    utilization(store.nodes(), store.edges(line), line, target)
}

/// Which pair of roles a targeted reachability query links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReachKind {
    /// The line's product to a Resource.
    ProductToResource,
    /// The line's product to a Process.
    ProductToProcess,
    /// One Process to another.
    ProcessToProcess,
}

impl ReachKind {
    /// Required `(source, target)` node types within `line`.
    pub fn roles(self, line: ProductLine) -> (NodeType, NodeType) {
        match self {
            ReachKind::ProductToResource => (line.product_type(), NodeType::Resource),
            ReachKind::ProductToProcess => (line.product_type(), NodeType::Process),
            ReachKind::ProcessToProcess => (NodeType::Process, NodeType::Process),
        }
    }
}

impl FromStr for ReachKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "product-resource" | "product-to-resource" => Ok(ReachKind::ProductToResource),
            "product-process" | "product-to-process" => Ok(ReachKind::ProductToProcess),
            "process-process" | "process-to-process" => Ok(ReachKind::ProcessToProcess),
            other => Err(format!(
                "unknown reach kind '{}' (expected product-resource, product-process or process-process)",
                other
            )),
        }
    }
}

/// Nodes of a path plus the arcs joining consecutive members.
#[derive(Debug, Clone, Serialize)]
pub struct PathSubgraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Outcome of a targeted reachability query.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Reachability {
    Reached {
        path: Vec<String>,
        subgraph: PathSubgraph,
    },
    NoPath {
        from: String,
        to: String,
    },
}

impl Reachability {
    pub fn is_reached(&self) -> bool {
        matches!(self, Reachability::Reached { .. })
    }
}

/// Link a selected source to a selected target of the roles named by `kind`.
///
/// Disconnection is an ordinary outcome; only unknown names and role
/// mismatches are errors.
pub fn targeted_reachability(
    graph: &DirectedGraph,
    kind: ReachKind,
    source: &str,
    target: &str,
) -> Result<Reachability, AnalysisError> {
    let (source_role, target_role) = kind.roles(graph.line());
    check_role(graph, source, source_role)?;
    check_role(graph, target, target_role)?;

    match shortest_path(graph, source, target) {
        Ok(path) => {
            let subgraph = induced_path_subgraph(graph, &path)?;
            Ok(Reachability::Reached { path, subgraph })
        }
        Err(AnalysisError::NoPath { from, to }) => {
            tracing::debug!(%from, %to, "no path for targeted reachability");
            Ok(Reachability::NoPath { from, to })
        }
        Err(e) => Err(e),
    }
}

fn check_role(graph: &DirectedGraph, name: &str, expected: NodeType) -> Result<(), AnalysisError> {
    let v = graph.require(name)?;
    let actual = graph.vertex(v).node_type;
    if actual == expected {
        Ok(())
    } else {
        Err(AnalysisError::RoleMismatch {
            name: name.to_string(),
            expected,
            actual,
        })
    }
}

/// Extract the ordered path members and every arc (parallel ones included)
/// from each member to the next.
pub fn induced_path_subgraph(
    graph: &DirectedGraph,
    path: &[String],
) -> Result<PathSubgraph, AnalysisError> {
    let indices = path
        .iter()
        .map(|name| graph.require(name))
        .collect::<Result<Vec<_>, _>>()?;

    let nodes = indices.iter().map(|&v| graph.vertex(v).clone()).collect();
    let mut edges = Vec::new();
    for pair in indices.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        edges.extend(
            graph
                .out_arcs(from)
                .iter()
                .map(|&a| graph.arc(a))
                .filter(|arc| arc.from == from && arc.to == to)
                .map(|arc| arc.edge.clone()),
        );
    }

    Ok(PathSubgraph { nodes, edges })
}
