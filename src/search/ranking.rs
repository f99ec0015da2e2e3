//! Ranking of bio-index gene, gene-set and factor rows

use crate::bioindex::{FactorRecord, GenePhenotypeRecord, GeneSetPhenotypeRecord};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Which support score ranks genes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneMetric {
    Combined,
    /// Gene-set prior
    Indirect,
    /// Direct GWAS evidence (log Bayes factor)
    Direct,
}

impl GeneMetric {
    fn score(self, record: &GenePhenotypeRecord) -> f64 {
        match self {
            GeneMetric::Combined => record.combined,
            GeneMetric::Indirect => record.prior,
            GeneMetric::Direct => record.log_bf,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GeneMetric::Combined => "combined",
            GeneMetric::Indirect => "indirect",
            GeneMetric::Direct => "direct",
        }
    }
}

impl fmt::Display for GeneMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized metric name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMetric(pub String);

impl fmt::Display for InvalidMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid metric: {}", self.0)
    }
}

impl std::error::Error for InvalidMetric {}

impl FromStr for GeneMetric {
    type Err = InvalidMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "combined" => Ok(GeneMetric::Combined),
            "indirect" => Ok(GeneMetric::Indirect),
            "direct" => Ok(GeneMetric::Direct),
            other => Err(InvalidMetric(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopGene {
    pub gene_id: String,
    pub gene_name: String,
    pub metric_value: f64,
    pub metric_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneSetHit {
    pub metric_value: f64,
    pub metric_name: String,
    pub gene_set: String,
    pub phenotype: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Factor {
    pub factor_label: String,
    pub gene_set_score: f64,
    pub gene_score: f64,
    pub top_genes: Vec<String>,
    pub top_gene_sets: Vec<String>,
}

/// Genes ranked by `metric`, highest first
pub fn top_genes(records: &[GenePhenotypeRecord], metric: GeneMetric, top_n: usize) -> Vec<TopGene> {
    let mut ranked: Vec<&GenePhenotypeRecord> = records.iter().collect();
    ranked.sort_by(|a, b| metric.score(b).total_cmp(&metric.score(a)));
    ranked
        .into_iter()
        .take(top_n)
        .map(|r| TopGene {
            gene_id: r.gene.clone(),
            gene_name: r.gene.clone(),
            metric_value: metric.score(r),
            metric_name: metric.to_string(),
        })
        .collect()
}

/// Gene sets ranked by a metric column, highest first. Rows without a
/// numeric value for the column are left out.
pub fn top_gene_sets(records: &[GeneSetPhenotypeRecord], metric: &str, top_n: usize) -> Vec<GeneSetHit> {
    let mut hits: Vec<GeneSetHit> = records
        .iter()
        .filter_map(|r| {
            Some(GeneSetHit {
                metric_value: r.metric(metric)?,
                metric_name: metric.to_string(),
                gene_set: r.gene_set.clone(),
                phenotype: r.phenotype.clone(),
            })
        })
        .collect();
    hits.sort_by(|a, b| b.metric_value.total_cmp(&a.metric_value));
    hits.truncate(top_n);
    hits
}

/// Factors ranked by gene-set score, highest first
pub fn rank_factors(records: &[FactorRecord]) -> Vec<Factor> {
    let mut factors: Vec<Factor> = records
        .iter()
        .map(|r| Factor {
            factor_label: r.label.clone(),
            gene_set_score: r.gene_set_score,
            gene_score: r.gene_score,
            top_genes: split_list(&r.top_genes),
            top_gene_sets: split_list(&r.top_gene_sets),
        })
        .collect();
    factors.sort_by(|a, b| b.gene_set_score.total_cmp(&a.gene_set_score));
    factors
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
