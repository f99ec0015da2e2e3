//! Lookup from raw phenotype names to reconciled phenotypes

use crate::model::Phenotype;
use std::collections::HashMap;

/// Result of inserting a phenotype into the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    /// New name, new id
    Inserted,
    /// New name whose id is already owned by another name
    AliasedId,
    /// Name already indexed; nothing changed
    DuplicateName,
}

/// Reconciled phenotypes keyed by the raw name they were resolved from.
///
/// Every indexed name points at exactly one phenotype, and every phenotype
/// id appears once even when several names resolve to it.
#[derive(Debug, Default)]
pub struct PhenotypeIndex {
    phenotypes: Vec<Phenotype>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
    names: Vec<String>,
}

impl PhenotypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, phenotype: Phenotype) -> IndexOutcome {
        if self.by_name.contains_key(&phenotype.name) {
            return IndexOutcome::DuplicateName;
        }
        self.names.push(phenotype.name.clone());

        if let Some(&idx) = self.by_id.get(&phenotype.id) {
            self.by_name.insert(phenotype.name, idx);
            return IndexOutcome::AliasedId;
        }

        let idx = self.phenotypes.len();
        self.by_name.insert(phenotype.name.clone(), idx);
        self.by_id.insert(phenotype.id.clone(), idx);
        self.phenotypes.push(phenotype);
        IndexOutcome::Inserted
    }

    /// Phenotype resolved from a raw name
    pub fn get(&self, name: &str) -> Option<&Phenotype> {
        self.by_name.get(name).map(|&idx| &self.phenotypes[idx])
    }

    /// Phenotype by reconciled graph id
    pub fn by_id(&self, id: &str) -> Option<&Phenotype> {
        self.by_id.get(id).map(|&idx| &self.phenotypes[idx])
    }

    /// Indexed raw names, aliases included, in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Distinct phenotypes in insertion order
    pub fn phenotypes(&self) -> impl Iterator<Item = &Phenotype> {
        self.phenotypes.iter()
    }

    /// Number of distinct phenotypes
    pub fn len(&self) -> usize {
        self.phenotypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phenotypes.is_empty()
    }
}
