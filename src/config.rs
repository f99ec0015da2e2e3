//! Pipeline configuration
//!
//! Loaded from a YAML file. Every field has a default, so an empty file (or
//! no file at all) yields a usable configuration.

use crate::bioindex::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BioIndexConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BioIndexConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

/// Locations of the reference tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferencePaths {
    pub portal_traits: PathBuf,
    pub gcat_studies: PathBuf,
    pub orphanet_ontology: PathBuf,
}

impl Default for ReferencePaths {
    fn default() -> Self {
        Self {
            portal_traits: PathBuf::from("data/amp-traits-mapping-portal-phenotypes.csv"),
            gcat_studies: PathBuf::from("data/gcat_v1.0.3.1.tsv"),
            orphanet_ontology: PathBuf::from("data/ORDO_en_4.5.owl"),
        }
    }
}

/// Gene-association ingestion and ranking parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociationConfig {
    pub enabled: bool,
    pub sigma: u32,
    pub geneset_size: String,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sigma: 2,
            geneset_size: "small".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub top_n: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { top_n: 50 }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub bioindex: BioIndexConfig,
    pub references: ReferencePaths,
    /// Graph database path; the CLI falls back to its data directory
    pub database: Option<PathBuf>,
    pub associations: AssociationConfig,
    pub search: SearchConfig,
}

impl PipelineConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        // Relative paths are resolved against the config file
        if let Some(dir) = path.parent() {
            config.references.resolve_against(dir);
            if let Some(database) = config.database.as_mut() {
                *database = resolve_path(database, dir);
            }
        }
        Ok(config)
    }

    /// Database to open: an explicit path wins over the configured one,
    /// which wins over `fallback`
    pub fn database_path(
        &self,
        explicit: Option<PathBuf>,
        fallback: impl FnOnce() -> PathBuf,
    ) -> PathBuf {
        explicit
            .or_else(|| self.database.clone())
            .unwrap_or_else(fallback)
    }

    /// Load `path` when it exists, defaults otherwise
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_path(path)
        } else {
            Ok(Self::default())
        }
    }
}

impl ReferencePaths {
    fn resolve_against(&mut self, dir: &Path) {
        for path in [
            &mut self.portal_traits,
            &mut self.gcat_studies,
            &mut self.orphanet_ontology,
        ] {
            *path = resolve_path(path, dir);
        }
    }
}

/// Expand a leading `~` to the home directory, then anchor relative paths
/// at `dir`
fn resolve_path(path: &Path, dir: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path.is_relative() {
        dir.join(path)
    } else {
        path.to_path_buf()
    }
}
