//! Reference tables used to reconcile phenotype identifiers
//!
//! Three tables are loaded once per run and only read afterwards:
//!
//! - [`PortalTraitTable`]: the portal trait mapping (CSV)
//! - [`GcatStudyTable`]: the GWAS-catalog studies export (TSV)
//! - [`OrphanetOntology`]: the Orphanet rare-disease ontology (RDF/XML)
//!
//! Malformed rows are dropped while loading, so lookups never see them.

mod gcat;
mod orphanet;
mod portal;

pub use gcat::{normalize_curie, normalize_trait_name, GcatStudy, GcatStudyTable};
pub use orphanet::{OrphanetClass, OrphanetOntology};
pub use portal::{PortalTrait, PortalTraitTable};

use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors raised while loading a reference table
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("RDF parse error: {0}")]
    Rdf(String),
}

/// Result type for reference table loading
pub type ReferenceResult<T> = Result<T, ReferenceError>;

/// The three reference tables, loaded together
#[derive(Debug, Default)]
pub struct ReferenceTables {
    pub portal: PortalTraitTable,
    pub gcat: GcatStudyTable,
    pub orphanet: OrphanetOntology,
}

impl ReferenceTables {
    /// Load every table from disk
    pub fn load(
        portal_traits: impl AsRef<Path>,
        gcat_studies: impl AsRef<Path>,
        orphanet_ontology: impl AsRef<Path>,
    ) -> ReferenceResult<Self> {
        let portal = PortalTraitTable::from_path(portal_traits)?;
        let gcat = GcatStudyTable::from_path(gcat_studies)?;
        let orphanet = OrphanetOntology::from_path(orphanet_ontology)?;
        info!(
            portal_traits = portal.len(),
            gcat_studies = gcat.len(),
            orphanet_classes = orphanet.len(),
            "loaded reference tables"
        );
        Ok(Self {
            portal,
            gcat,
            orphanet,
        })
    }
}
