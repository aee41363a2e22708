//! Session-owned store of nodes and the two product-line edge collections.

use crate::error::StoreError;
use crate::model::{Attributes, Edge, Node, NodeType, ProductLine, RelationKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// All node and edge records of one editing session.
///
/// Serializes to the PPR document shape
/// `{"nodes": [...], "product 1": [...], "product 2": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityStore {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(rename = "product 1", default)]
    product_1: Vec<Edge>,
    #[serde(rename = "product 2", default)]
    product_2: Vec<Edge>,
    /// Document-level keys outside the known set, kept verbatim.
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// Changes applied by [`EntityStore::update_node`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct NodeUpdate {
    pub name: Option<String>,
    pub node_type: Option<NodeType>,
    pub attributes: Option<Attributes>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a store from raw collections without validation.
    pub fn from_parts(nodes: Vec<Node>, product_1: Vec<Edge>, product_2: Vec<Edge>) -> Self {
        Self {
            nodes,
            product_1,
            product_2,
            extra: BTreeMap::new(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.node(name).is_some()
    }

    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.node_type == node_type)
    }

    /// Nodes that may take part in `line`'s graph.
    pub fn selectable_nodes(&self, line: ProductLine) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| line.admits(n.node_type))
    }

    pub fn edges(&self, line: ProductLine) -> &[Edge] {
        match line {
            ProductLine::One => &self.product_1,
            ProductLine::Two => &self.product_2,
        }
    }

    fn edges_mut(&mut self, line: ProductLine) -> &mut Vec<Edge> {
        match line {
            ProductLine::One => &mut self.product_1,
            ProductLine::Two => &mut self.product_2,
        }
    }

    pub fn edge(&self, line: ProductLine, id: Uuid) -> Option<&Edge> {
        self.edges(line).iter().find(|e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.product_1.is_empty() && self.product_2.is_empty()
    }

    /// Insert an already-built node record (e.g. from an import).
    pub fn insert_node(&mut self, node: Node) -> Result<Uuid, StoreError> {
        self.check_new_name(&node.name)?;
        let id = node.id;
        self.nodes.push(node);
        Ok(id)
    }

    /// Create a node with a fresh UUID.
    pub fn create_node(
        &mut self,
        name: &str,
        node_type: NodeType,
        attributes: Attributes,
    ) -> Result<Uuid, StoreError> {
        let node = Node::new(name.trim(), node_type).with_attributes(attributes);
        let id = self.insert_node(node)?;
        tracing::debug!(node = name.trim(), %node_type, "created node");
        Ok(id)
    }

    /// Update a node in place. A rename is cascaded into every edge of both
    /// product lines that references the old name.
    pub fn update_node(&mut self, name: &str, update: NodeUpdate) -> Result<(), StoreError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.name == name)
            .ok_or_else(|| StoreError::NodeNotFound(name.to_string()))?;

        // A new type must still be admitted by every line the node has relations in.
        if let Some(node_type) = update.node_type {
            for line in ProductLine::ALL {
                if !line.admits(node_type) && self.edges(line).iter().any(|e| e.touches(name)) {
                    return Err(StoreError::EndpointNotAllowed {
                        name: name.to_string(),
                        node_type,
                        line,
                    });
                }
            }
        }

        if let Some(new_name) = update.name.as_deref().map(str::trim)
            && new_name != name
        {
            self.check_new_name(new_name)?;
            self.nodes[index].name = new_name.to_string();
            let renamed = self.rename_in_edges(name, new_name);
            tracing::debug!(from = name, to = new_name, edges = renamed, "renamed node");
        }

        let node = &mut self.nodes[index];
        if let Some(node_type) = update.node_type {
            node.node_type = node_type;
        }
        if let Some(attributes) = update.attributes {
            node.attributes = attributes;
        }
        Ok(())
    }

    fn rename_in_edges(&mut self, old: &str, new: &str) -> usize {
        let mut touched = 0;
        for edge in self.product_1.iter_mut().chain(self.product_2.iter_mut()) {
            if edge.source == old {
                edge.source = new.to_string();
                touched += 1;
            }
            if edge.target == old {
                edge.target = new.to_string();
                touched += 1;
            }
        }
        touched
    }

    /// Remove a node and every edge that references it.
    pub fn delete_node(&mut self, name: &str) -> Result<Node, StoreError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.name == name)
            .ok_or_else(|| StoreError::NodeNotFound(name.to_string()))?;
        let node = self.nodes.remove(index);
        let removed = self.remove_edges_touching(name);
        tracing::debug!(node = name, edges = removed, "deleted node");
        Ok(node)
    }

    /// Add a relation to `line`'s edge collection.
    pub fn create_relation(
        &mut self,
        line: ProductLine,
        source: &str,
        relation: RelationKind,
        target: &str,
    ) -> Result<Uuid, StoreError> {
        for endpoint in [source, target] {
            let node = self
                .node(endpoint)
                .ok_or_else(|| StoreError::NodeNotFound(endpoint.to_string()))?;
            if !line.admits(node.node_type) {
                return Err(StoreError::EndpointNotAllowed {
                    name: node.name.clone(),
                    node_type: node.node_type,
                    line,
                });
            }
        }

        let edge = Edge::new(source, relation, target);
        let id = edge.id;
        self.edges_mut(line).push(edge);
        tracing::debug!(%line, from = source, to = target, %relation, "created relation");
        Ok(id)
    }

    /// Append an edge record without endpoint validation (import path).
    pub fn push_edge(&mut self, line: ProductLine, edge: Edge) {
        self.edges_mut(line).push(edge);
    }

    /// Remove one relation by id.
    pub fn delete_relation(&mut self, line: ProductLine, id: Uuid) -> Result<Edge, StoreError> {
        let edges = self.edges_mut(line);
        let index = edges
            .iter()
            .position(|e| e.id == id)
            .ok_or(StoreError::EdgeNotFound { line, id })?;
        Ok(edges.remove(index))
    }

    /// Remove every relation in both lines that references `name`, keeping the
    /// node itself. Returns the number of relations removed.
    pub fn delete_relations_touching(&mut self, name: &str) -> Result<usize, StoreError> {
        if !self.contains_node(name) {
            return Err(StoreError::NodeNotFound(name.to_string()));
        }
        Ok(self.remove_edges_touching(name))
    }

    fn remove_edges_touching(&mut self, name: &str) -> usize {
        let before = self.product_1.len() + self.product_2.len();
        self.product_1.retain(|e| !e.touches(name));
        self.product_2.retain(|e| !e.touches(name));
        before - self.product_1.len() - self.product_2.len()
    }

    /// Names that appear more than once in the node list.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for node in &self.nodes {
            *seen.entry(node.name.as_str()).or_default() += 1;
        }
        seen.into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name)
            .collect()
    }

    fn check_new_name(&self, name: &str) -> Result<(), StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::EmptyName);
        }
        if self.contains_node(name) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> EntityStore {
        let mut store = EntityStore::new();
        store
            .create_node("Bracket", NodeType::Product1, Attributes::default())
            .unwrap();
        store
            .create_node("Cut", NodeType::Process, Attributes::default())
            .unwrap();
        store
            .create_node("Laser", NodeType::Resource, Attributes::default())
            .unwrap();
        store
            .create_node("Housing", NodeType::Product2, Attributes::default())
            .unwrap();
        store
    }

    #[test]
    fn test_create_node_rejects_duplicates_and_blanks() {
        let mut store = store();
        assert_eq!(
            store.create_node("Cut", NodeType::Process, Attributes::default()),
            Err(StoreError::DuplicateName("Cut".into()))
        );
        assert_eq!(
            store.create_node("  ", NodeType::Process, Attributes::default()),
            Err(StoreError::EmptyName)
        );
        assert_eq!(store.nodes().len(), 4);
    }

    #[test]
    fn test_create_relation_checks_line_admission() {
        let mut store = store();
        store
            .create_relation(ProductLine::One, "Bracket", RelationKind::InputFor, "Cut")
            .unwrap();
        let err = store
            .create_relation(ProductLine::One, "Housing", RelationKind::InputFor, "Cut")
            .unwrap_err();
        assert!(matches!(err, StoreError::EndpointNotAllowed { .. }));
        let err = store
            .create_relation(ProductLine::Two, "Cut", RelationKind::ExecutedBy, "Nope")
            .unwrap_err();
        assert_eq!(err, StoreError::NodeNotFound("Nope".into()));
        assert_eq!(store.edges(ProductLine::One).len(), 1);
        assert!(store.edges(ProductLine::Two).is_empty());
    }

    #[test]
    fn test_rename_cascades_into_both_lines() {
        let mut store = store();
        store
            .create_relation(ProductLine::One, "Cut", RelationKind::ExecutedBy, "Laser")
            .unwrap();
        store
            .create_relation(ProductLine::Two, "Housing", RelationKind::InputFor, "Cut")
            .unwrap();

        store
            .update_node(
                "Cut",
                NodeUpdate {
                    name: Some("Laser cut".into()),
                    ..NodeUpdate::default()
                },
            )
            .unwrap();

        assert!(store.node("Cut").is_none());
        assert!(store.node("Laser cut").is_some());
        assert_eq!(store.edges(ProductLine::One)[0].source, "Laser cut");
        assert_eq!(store.edges(ProductLine::Two)[0].target, "Laser cut");
    }

    #[test]
    fn test_rename_onto_existing_name_fails() {
        let mut store = store();
        let err = store
            .update_node(
                "Cut",
                NodeUpdate {
                    name: Some("Laser".into()),
                    ..NodeUpdate::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateName("Laser".into()));
    }

    #[test]
    fn test_update_type_only() {
        let mut store = store();
        store
            .update_node(
                "Laser",
                NodeUpdate {
                    node_type: Some(NodeType::Process),
                    ..NodeUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(store.node("Laser").unwrap().node_type, NodeType::Process);
    }

    #[test]
    fn test_type_change_rejected_while_line_relations_remain() {
        let mut store = store();
        store
            .create_relation(ProductLine::One, "Bracket", RelationKind::InputFor, "Cut")
            .unwrap();

        let err = store
            .update_node(
                "Bracket",
                NodeUpdate {
                    name: Some("Bracket v2".into()),
                    node_type: Some(NodeType::Product2),
                    ..NodeUpdate::default()
                },
            )
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::EndpointNotAllowed {
                name: "Bracket".into(),
                node_type: NodeType::Product2,
                line: ProductLine::One,
            }
        );
        // Nothing applied, not even the rename.
        let bracket = store.node("Bracket").unwrap();
        assert_eq!(bracket.node_type, NodeType::Product1);
        assert_eq!(store.edges(ProductLine::One)[0].source, "Bracket");

        store.delete_relations_touching("Bracket").unwrap();
        store
            .update_node(
                "Bracket",
                NodeUpdate {
                    node_type: Some(NodeType::Product2),
                    ..NodeUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(store.node("Bracket").unwrap().node_type, NodeType::Product2);
    }

    #[test]
    fn test_delete_node_cascades() {
        let mut store = store();
        store
            .create_relation(ProductLine::One, "Cut", RelationKind::ExecutedBy, "Laser")
            .unwrap();
        store
            .create_relation(ProductLine::Two, "Cut", RelationKind::ExecutedBy, "Laser")
            .unwrap();
        store
            .create_relation(ProductLine::One, "Bracket", RelationKind::InputFor, "Cut")
            .unwrap();

        let removed = store.delete_node("Laser").unwrap();
        assert_eq!(removed.name, "Laser");
        assert_eq!(store.edges(ProductLine::One).len(), 1);
        assert!(store.edges(ProductLine::Two).is_empty());
        assert!(store.delete_node("Laser").is_err());
    }

    #[test]
    fn test_delete_relation_by_id() {
        let mut store = store();
        let id = store
            .create_relation(ProductLine::One, "Cut", RelationKind::ExecutedBy, "Laser")
            .unwrap();
        assert!(store.delete_relation(ProductLine::Two, id).is_err());
        let edge = store.delete_relation(ProductLine::One, id).unwrap();
        assert_eq!(edge.relation, RelationKind::ExecutedBy);
        assert!(store.edges(ProductLine::One).is_empty());
    }

    #[test]
    fn test_delete_relations_touching_keeps_node() {
        let mut store = store();
        store
            .create_relation(ProductLine::One, "Cut", RelationKind::ExecutedBy, "Laser")
            .unwrap();
        store
            .create_relation(ProductLine::Two, "Housing", RelationKind::InputFor, "Cut")
            .unwrap();
        store
            .create_relation(ProductLine::One, "Bracket", RelationKind::InputFor, "Laser")
            .unwrap();

        assert_eq!(store.delete_relations_touching("Cut").unwrap(), 2);
        assert!(store.contains_node("Cut"));
        assert_eq!(store.edges(ProductLine::One).len(), 1);
    }

    #[test]
    fn test_selectable_nodes_excludes_other_product() {
        let store = store();
        let names: Vec<&str> = store
            .selectable_nodes(ProductLine::One)
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["Bracket", "Cut", "Laser"]);
    }

    #[test]
    fn test_duplicate_names() {
        let store = EntityStore::from_parts(
            vec![
                Node::new("A", NodeType::Process),
                Node::new("A", NodeType::Resource),
                Node::new("B", NodeType::Resource),
            ],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(store.duplicate_names(), vec!["A"]);
    }
}
