//! Node entities: genes, phenotypes and GWAS studies

use super::property::{Properties, PropertyValue};
use serde::{Deserialize, Serialize};

/// Node labels used in the graph store
pub mod label {
    pub const GENE: &str = "Gene";
    pub const PHENOTYPE: &str = "Phenotype";
    pub const GWAS: &str = "Gwas";
}

/// Description used when a source carries none
pub const NO_DESCRIPTION: &str = "No description available";

/// Description of a portal phenotype missing from the trait mapping table
pub const PORTAL_FALLBACK_DESCRIPTION: &str =
    "No description available. Not found in AMP traits mapping.";

/// Id prefix of phenotypes reconciled through the portal trait table
pub const PORTAL_ID_PREFIX: &str = "PORTAL.TRAIT:";

/// A gene, keyed by its symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub id: String,
    pub symbol: String,
    pub has_xrefs: Vec<String>,
}

impl Gene {
    /// Gene identified by its symbol, with no cross-references
    pub fn from_symbol(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            id: symbol.clone(),
            symbol,
            has_xrefs: Vec::new(),
        }
    }

    pub fn properties(&self) -> Properties {
        let mut props = Properties::new();
        props.insert("symbol".into(), self.symbol.as_str().into());
        props.insert("has_xrefs".into(), PropertyValue::from(&self.has_xrefs[..]));
        props
    }
}

/// A reconciled phenotype
///
/// `name` is always the raw source identifier the phenotype was resolved
/// from; `id` is the reconciled graph identifier (an ontology URI, a CURIE or
/// a `PORTAL.TRAIT:` id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phenotype {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub has_xrefs: Vec<String>,
}

impl Phenotype {
    pub fn properties(&self) -> Properties {
        let mut props = Properties::new();
        props.insert("name".into(), self.name.as_str().into());
        props.insert("display_name".into(), self.display_name.as_str().into());
        props.insert("description".into(), self.description.as_str().into());
        props.insert("has_xrefs".into(), PropertyValue::from(&self.has_xrefs[..]));
        props
    }
}

/// A GWAS-catalog study of a phenotype
///
/// The phenotype is referenced by id. It is resolved before the study is
/// built, and the two are written as separate entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gwas {
    pub id: String,
    /// Raw study accession, e.g. `GCST001`
    pub name: String,
    pub description: String,
    pub phenotype: String,
}

impl Gwas {
    /// Build a study from its catalog accession. The id keeps only the part
    /// after the last `GCST` marker: `GCST001` becomes `GCST:001`.
    pub fn from_accession(
        accession: &str,
        title: impl Into<String>,
        phenotype_id: impl Into<String>,
    ) -> Self {
        let suffix = accession.rsplit("GCST").next().unwrap_or(accession);
        Self {
            id: format!("GCST:{}", suffix),
            name: accession.to_string(),
            description: title.into(),
            phenotype: phenotype_id.into(),
        }
    }

    pub fn properties(&self) -> Properties {
        let mut props = Properties::new();
        props.insert("name".into(), self.name.as_str().into());
        props.insert("description".into(), self.description.as_str().into());
        props
    }
}
