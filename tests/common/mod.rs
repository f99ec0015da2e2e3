//! Shared helpers for the integration tests
//!
//! Provides an in-memory bio-index, a deterministic embedder and the
//! on-disk reference fixtures.

#![allow(dead_code)]

use portal_graph::bioindex::{
    phenotype_query, FACTOR_INDEX, GENE_PHENOTYPE_INDEX, GENE_SET_PHENOTYPE_INDEX,
    PHENOTYPES_INDEX,
};
use portal_graph::search::{Embedder, EmbeddingError};
use portal_graph::{BioIndexClient, BioIndexError, ReferenceTables};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn reference_tables() -> ReferenceTables {
    ReferenceTables::load(
        fixture("portal_traits.csv"),
        fixture("gcat_studies.tsv"),
        fixture("orphanet.owl"),
    )
    .expect("fixtures should load")
}

/// Bio-index stand-in answering from a fixed `(index, q)` table.
///
/// Unknown queries return no rows; queries listed in `failing` return a
/// server error.
#[derive(Default)]
pub struct MockBioIndex {
    rows: HashMap<(String, String), Vec<Value>>,
    failing: Vec<(String, String)>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl MockBioIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, index: &str, q: &str, rows: Vec<Value>) -> Self {
        self.rows.insert((index.to_string(), q.to_string()), rows);
        self
    }

    pub fn failing(mut self, index: &str, q: &str) -> Self {
        self.failing.push((index.to_string(), q.to_string()));
        self
    }

    pub fn call_count(&self, index: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(i, _)| i == index)
            .count()
    }
}

impl BioIndexClient for MockBioIndex {
    fn query(&self, index: &str, q: &str) -> Result<Vec<Value>, BioIndexError> {
        let key = (index.to_string(), q.to_string());
        self.calls.lock().unwrap().push(key.clone());
        if self.failing.contains(&key) {
            return Err(BioIndexError::Status {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(self.rows.get(&key).cloned().unwrap_or_default())
    }
}

fn phenotype(id: &str, name: &str) -> Value {
    json!({"phenotype": id, "phenotype_name": name, "trait_group": "portal"})
}

fn gene(gene: &str, phenotype: &str, combined: f64, log_bf: f64, prior: f64) -> Value {
    json!({
        "gene": gene,
        "phenotype": phenotype,
        "combined": combined,
        "log_bf": log_bf,
        "prior": prior
    })
}

/// Phenotype listing covering every source, an alias, a duplicate name and
/// unresolvable identifiers
pub fn phenotype_rows() -> Vec<Value> {
    vec![
        phenotype("T2D", "Type 2 diabetes"),
        phenotype("eGFRcrcys", "eGFR-cys (serum cystatin C)"),
        phenotype("BMI", "Body mass index"),
        phenotype("BMI_v1", "BMI (legacy)"),
        phenotype("HbA1c", "Glycated hemoglobin"),
        phenotype("gcat_trait_body_mass_index", "Body mass index (catalog)"),
        phenotype("gcat_trait_type_2_diabetes_mellitus", "Type 2 diabetes mellitus"),
        phenotype("Marfan_syndrome_Orphanet_558", "Marfan syndrome (MFS)"),
        phenotype("Rare_disease_Orphanet_5580", "Unknown rare disease"),
        phenotype("gcat_trait_unknown_trait", "Unknown catalog trait"),
        phenotype("T2D", "Type 2 diabetes (repeat)"),
    ]
}

/// Bio-index with the standard phenotype listing and gene associations
pub fn standard_bioindex() -> MockBioIndex {
    let q = |name: &str| phenotype_query(name, 2, "small");
    MockBioIndex::new()
        .with_rows(PHENOTYPES_INDEX, "1", phenotype_rows())
        .with_rows(
            GENE_PHENOTYPE_INDEX,
            &q("T2D"),
            vec![
                gene("TCF7L2", "T2D", 5.0, 4.0, 1.0),
                gene("SLC30A8", "T2D", 3.0, 2.0, 1.0),
                json!({"gene": "BROKEN", "phenotype": "T2D"}),
            ],
        )
        .with_rows(
            GENE_PHENOTYPE_INDEX,
            &q("eGFRcrcys"),
            vec![
                gene("UMOD", "eGFRcrcys", 6.0, 5.5, 0.5),
                gene("SHROOM3", "eGFRcys_unloaded", 2.0, 1.0, 1.0),
            ],
        )
        .with_rows(
            GENE_PHENOTYPE_INDEX,
            &q("BMI_v1"),
            vec![gene("FTO", "BMI_v1", 4.0, 3.5, 0.5)],
        )
        .with_rows(
            GENE_PHENOTYPE_INDEX,
            &q("gcat_trait_type_2_diabetes_mellitus"),
            vec![gene("TCF7L2", "gcat_trait_type_2_diabetes_mellitus", 2.0, 1.5, 0.5)],
        )
        .with_rows(
            GENE_PHENOTYPE_INDEX,
            &q("Marfan_syndrome_Orphanet_558"),
            vec![gene("FBN1", "Marfan_syndrome_Orphanet_558", 7.0, 6.0, 1.0)],
        )
        .with_rows(
            GENE_SET_PHENOTYPE_INDEX,
            &q("T2D"),
            vec![
                json!({"gene_set": "GO_INSULIN_SECRETION", "phenotype": "T2D", "beta": 0.8, "beta_uncorrected": 1.2}),
                json!({"gene_set": "KEGG_MODY", "phenotype": "T2D", "beta": 1.4, "beta_uncorrected": 0.9}),
                json!({"gene_set": "GO_NO_BETA", "phenotype": "T2D", "beta_uncorrected": 3.0}),
            ],
        )
        .with_rows(
            FACTOR_INDEX,
            &q("T2D"),
            vec![
                json!({
                    "label": "beta-cell function",
                    "gene_set_score": 2.5,
                    "gene_score": 1.5,
                    "top_genes": "TCF7L2;SLC30A8;",
                    "top_gene_sets": "GO_INSULIN_SECRETION;KEGG_MODY"
                }),
                json!({
                    "label": "adiposity",
                    "gene_set_score": 4.0,
                    "gene_score": 0.5,
                    "top_genes": "FTO",
                    "top_gene_sets": ""
                }),
            ],
        )
}

/// Embedder mapping known texts to fixed vectors; anything else embeds to
/// the zero vector.
pub struct MockEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl MockEmbedder {
    pub fn new(entries: &[(&str, [f32; 3])]) -> Self {
        Self {
            vectors: entries
                .iter()
                .map(|(text, v)| (text.to_string(), v.to_vec()))
                .collect(),
        }
    }
}

impl Embedder for MockEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts
            .iter()
            .map(|t| self.vectors.get(*t).cloned().unwrap_or_else(|| vec![0.0; 3]))
            .collect())
    }
}
