//! Errors raised by editing operations on an [`EntityStore`](crate::store::EntityStore).

use crate::model::{NodeType, ProductLine};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("node name must not be empty")]
    EmptyName,
    #[error("a node named '{0}' already exists")]
    DuplicateName(String),
    #[error("node not found: {0}")]
    NodeNotFound(String),
    #[error("relation not found in {line}: {id}")]
    EdgeNotFound { line: ProductLine, id: Uuid },
    #[error("'{name}' is a {node_type} node and cannot take part in {line}")]
    EndpointNotAllowed {
        name: String,
        node_type: NodeType,
        line: ProductLine,
    },
}
