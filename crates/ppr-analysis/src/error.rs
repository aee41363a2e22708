//! Errors raised while building or querying a product-line graph.
//!
//! `NotFound` and `NoPath` are expected, user-facing outcomes; callers report
//! them rather than treating them as failures of the session.

use ppr_core::model::{NodeType, ProductLine};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("node not found in {line}: {name}")]
    NotFound { line: ProductLine, name: String },
    #[error("there is no path between {from} and {to}")]
    NoPath { from: String, to: String },
    #[error("{line} relation {edge} references '{missing}', which is not a node of this line")]
    Integrity {
        line: ProductLine,
        edge: Uuid,
        missing: String,
    },
    #[error("node name '{name}' occurs more than once in {line}")]
    DuplicateNode { line: ProductLine, name: String },
    #[error("'{name}' is a {actual} node, expected {expected}")]
    RoleMismatch {
        name: String,
        expected: NodeType,
        actual: NodeType,
    },
}
