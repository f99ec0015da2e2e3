//! Typed records returned by bio-index queries

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One phenotype from the `pigean-phenotypes` index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhenotypeRecord {
    /// Raw source identifier
    pub phenotype: String,
    /// Human-readable name
    pub phenotype_name: String,
    #[serde(default)]
    pub trait_group: Option<String>,
    #[serde(default)]
    pub display_group: Option<String>,
}

/// Gene/phenotype scores from the `pigean-gene-phenotype` index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenePhenotypeRecord {
    pub gene: String,
    pub phenotype: String,
    pub combined: f64,
    pub log_bf: f64,
    pub prior: f64,
}

/// Gene-set/phenotype scores from the `pigean-gene-set-phenotype` index.
///
/// Metric columns vary between index versions, so every numeric field other
/// than the keys is kept by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneSetPhenotypeRecord {
    pub gene_set: String,
    pub phenotype: String,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, Value>,
}

impl GeneSetPhenotypeRecord {
    /// Numeric value of a metric column, if present
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).and_then(Value::as_f64)
    }
}

/// One factor from the `pigean-factor` index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRecord {
    pub label: String,
    pub gene_set_score: f64,
    pub gene_score: f64,
    /// `;`-separated gene symbols
    #[serde(default)]
    pub top_genes: String,
    /// `;`-separated gene-set names
    #[serde(default)]
    pub top_gene_sets: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gene_set_record_keeps_metric_columns() {
        let record: GeneSetPhenotypeRecord = serde_json::from_value(json!({
            "gene_set": "GO_KIDNEY",
            "phenotype": "eGFRcrcys",
            "beta": 0.25,
            "beta_uncorrected": 0.5,
            "source": "go"
        }))
        .unwrap();
        assert_eq!(record.metric("beta"), Some(0.25));
        assert_eq!(record.metric("source"), None);
        assert_eq!(record.metric("missing"), None);
    }

    #[test]
    fn phenotype_record_groups_are_optional() {
        let record: PhenotypeRecord = serde_json::from_value(json!({
            "phenotype": "T2D",
            "phenotype_name": "Type 2 diabetes"
        }))
        .unwrap();
        assert!(record.trait_group.is_none());
    }
}
