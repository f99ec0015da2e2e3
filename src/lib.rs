//! portal-graph: phenotype/gene knowledge graph loader
//!
//! Pulls phenotypes and gene associations from the bio-index API, reconciles
//! phenotype identifiers from three sources (portal traits, GWAS-catalog
//! traits, Orphanet rare diseases) into one schema, and upserts the result
//! into a property graph. A query service layer exposes semantic phenotype
//! search and PIGEAN rankings over MCP.
//!
//! # Core Concepts
//!
//! - **Reference tables**: lookup tables that resolve raw identifiers
//! - **Reconciliation**: mapping a raw identifier to a canonical phenotype
//! - **Upsert**: merge-by-identity writes that make re-runs idempotent
//!
//! # Example
//!
//! ```
//! use portal_graph::{GraphWriter, OpenStore, SqliteStore};
//! use portal_graph::model::Gene;
//!
//! let store = SqliteStore::open_in_memory().unwrap();
//! GraphWriter::new(&store).write(&[Gene::from_symbol("UMOD").into()]).unwrap();
//! ```

pub mod bioindex;
pub mod config;
pub mod mcp;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod reference;
pub mod search;
pub mod storage;

pub use bioindex::{BioIndexClient, BioIndexError, BioIndexHttpClient};
pub use config::{ConfigError, PipelineConfig};
pub use model::Entity;
pub use pipeline::{Pipeline, PipelineError, RunReport};
pub use reconcile::{classify, PhenotypeIndex, PhenotypeReconciler, SourceKind};
pub use reference::{ReferenceError, ReferenceTables};
pub use search::{PortalTools, SearchError};
pub use storage::{GraphStore, GraphWriter, OpenStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
