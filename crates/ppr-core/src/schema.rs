//! JSON import/export of PPR documents.
//!
//! A document has the shape `{"nodes": [...], "product 1": [...], "product 2": [...]}`
//! and survives a no-op import/export round trip field for field.

use crate::store::EntityStore;
use anyhow::{Context, Result};

/// Serialize a store to a pretty-printed JSON document.
pub fn to_json(store: &EntityStore) -> Result<String> {
    serde_json::to_string_pretty(store).context("failed to serialize PPR document to JSON")
}

/// Deserialize a store from a JSON document.
pub fn from_json(json: &str) -> Result<EntityStore> {
    let store: EntityStore =
        serde_json::from_str(json).context("failed to deserialize PPR document from JSON")?;
    validate_names(&store)?;
    Ok(store)
}

/// Node names are the cross-reference key and must be unique.
pub fn validate_names(store: &EntityStore) -> Result<()> {
    let duplicates = store.duplicate_names();
    if !duplicates.is_empty() {
        anyhow::bail!(
            "PPR document has duplicate node names: {}",
            duplicates.join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_rejects_duplicate_names() {
        let json = r#"{
            "nodes": [
                {"name": "A", "type": "Process", "id": "0d8a4f5e-2a55-4d0e-9b1f-5c4e1f9d7a01"},
                {"name": "A", "type": "Resource", "id": "0d8a4f5e-2a55-4d0e-9b1f-5c4e1f9d7a02"}
            ],
            "product 1": [],
            "product 2": []
        }"#;
        let err = from_json(json).unwrap_err();
        assert!(format!("{:#}", err).contains("duplicate node names: A"));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(from_json("{\"nodes\": 5}").is_err());
    }

    #[test]
    fn test_empty_document() {
        let store = from_json(r#"{"nodes": [], "product 1": [], "product 2": []}"#).unwrap();
        assert!(store.is_empty());
        let json = to_json(&store).unwrap();
        assert!(json.contains("\"product 1\""));
    }
}
