//! Read/write PPR documents from disk.

use crate::config::PprConfig;
use crate::schema;
use crate::store::EntityStore;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const PPR_DIR: &str = ".ppr";

/// Get the path to the `.ppr` directory for a given project root.
pub fn ppr_dir(project_root: &Path) -> PathBuf {
    project_root.join(PPR_DIR)
}

/// Get the path to the configured PPR document for a given project root.
pub fn document_path(project_root: &Path, config: &PprConfig) -> PathBuf {
    ppr_dir(project_root).join(&config.storage.document)
}

/// Check if a PPR document exists for the given project root.
pub fn exists(project_root: &Path, config: &PprConfig) -> bool {
    document_path(project_root, config).exists()
}

/// Load the project's PPR document.
pub fn load(project_root: &Path, config: &PprConfig) -> Result<EntityStore> {
    load_file(&document_path(project_root, config))
}

/// Save the project's PPR document, creating the `.ppr` directory if needed.
pub fn save(project_root: &Path, config: &PprConfig, store: &EntityStore) -> Result<()> {
    let dir = ppr_dir(project_root);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create PPR directory {}", dir.display()))?;
    save_file(&document_path(project_root, config), store)
}

/// Load a PPR document from an explicit path.
pub fn load_file(path: &Path) -> Result<EntityStore> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read PPR document from {}", path.display()))?;
    let store = schema::from_json(&json)
        .with_context(|| format!("invalid PPR document {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        nodes = store.nodes().len(),
        "loaded PPR document"
    );
    Ok(store)
}

/// Write a PPR document to an explicit path.
pub fn save_file(path: &Path, store: &EntityStore) -> Result<()> {
    let json = schema::to_json(store)?;
    fs::write(path, json)
        .with_context(|| format!("failed to write PPR document to {}", path.display()))?;
    Ok(())
}
