//! Configuration for PPR analysis and document storage.
//!
//! Load order: `.ppr/config.toml` → environment variables → defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Top-level PPR configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PprConfig {
    pub analysis: AnalysisConfig,
    pub storage: StorageConfig,
}

/// How the graph builder treats an edge whose endpoint is not a node of the
/// product line being built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityMode {
    /// Fail the build with an integrity error.
    #[default]
    Strict,
    /// Log a warning and leave the edge out of the built graph.
    Lenient,
}

impl fmt::Display for IntegrityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityMode::Strict => f.write_str("strict"),
            IntegrityMode::Lenient => f.write_str("lenient"),
        }
    }
}

impl FromStr for IntegrityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(IntegrityMode::Strict),
            "lenient" => Ok(IntegrityMode::Lenient),
            other => Err(format!(
                "unknown integrity mode '{}' (expected strict or lenient)",
                other
            )),
        }
    }
}

/// Analysis configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub integrity: IntegrityMode,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Document file name, relative to the `.ppr` directory.
    pub document: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            document: "graph.json".to_string(),
        }
    }
}

impl PprConfig {
    /// Load config from `.ppr/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".ppr").join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("invalid config in {}", config_path.display()))?
        } else {
            Self::default()
        };

        if let Ok(v) = std::env::var("PPR_INTEGRITY") {
            config.analysis.integrity = v
                .parse::<IntegrityMode>()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        if let Ok(v) = std::env::var("PPR_DOCUMENT") {
            config.storage.document = v;
        }

        if config.storage.document.trim().is_empty() {
            anyhow::bail!("storage.document must not be empty");
        }

        Ok(config)
    }
}
