//! Graph schema for the portal knowledge graph
//!
//! Four entity kinds make up a batch: genes, phenotypes, GWAS studies and
//! gene → phenotype support associations. Batches are heterogeneous lists of
//! [`Entity`] values handed to the upsert layer.

mod edge;
mod node;
mod property;

pub use edge::{edge_id, Support, SupportAssociation, STUDIES, SUPPORTS};
pub use node::{
    label, Gene, Gwas, Phenotype, NO_DESCRIPTION, PORTAL_FALLBACK_DESCRIPTION, PORTAL_ID_PREFIX,
};
pub use property::{Properties, PropertyValue};

/// Any entity that can be written to the graph
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Gene(Gene),
    Phenotype(Phenotype),
    Gwas(Gwas),
    SupportAssociation(SupportAssociation),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Entity::Gene(g) => &g.id,
            Entity::Phenotype(p) => &p.id,
            Entity::Gwas(s) => &s.id,
            Entity::SupportAssociation(a) => &a.id,
        }
    }

    /// Node label, or the predicate for association edges
    pub fn kind(&self) -> &str {
        match self {
            Entity::Gene(_) => label::GENE,
            Entity::Phenotype(_) => label::PHENOTYPE,
            Entity::Gwas(_) => label::GWAS,
            Entity::SupportAssociation(a) => &a.predicate,
        }
    }
}

impl From<Gene> for Entity {
    fn from(g: Gene) -> Self {
        Entity::Gene(g)
    }
}

impl From<Phenotype> for Entity {
    fn from(p: Phenotype) -> Self {
        Entity::Phenotype(p)
    }
}

impl From<Gwas> for Entity {
    fn from(s: Gwas) -> Self {
        Entity::Gwas(s)
    }
}

impl From<SupportAssociation> for Entity {
    fn from(a: SupportAssociation) -> Self {
        Entity::SupportAssociation(a)
    }
}
