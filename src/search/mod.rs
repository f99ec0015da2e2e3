//! Phenotype search and gene ranking service
//!
//! `PortalTools` backs the MCP tools: semantic phenotype lookup, ranked
//! genes, gene sets and factors for a phenotype, and read-only queries
//! against the loaded graph.

mod embedding;
mod phenotypes;
mod ranking;

#[cfg(feature = "embeddings")]
pub use embedding::FastEmbedEmbedder;
pub use embedding::{cosine_similarity, Embedder, EmbeddingError};
pub use phenotypes::{PhenotypeMatch, PhenotypeSearchIndex};
pub use ranking::{
    rank_factors, top_gene_sets, top_genes, Factor, GeneMetric, GeneSetHit, InvalidMetric, TopGene,
};

use crate::bioindex::{
    fetch_factors, fetch_gene_phenotypes, fetch_gene_set_phenotypes, fetch_phenotypes,
    BioIndexClient, BioIndexError,
};
use crate::storage::{GraphStore, QueryRow, StorageError};
use thiserror::Error;
use tracing::info;

/// Errors returned by the service layer
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    BioIndex(#[from] BioIndexError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    InvalidMetric(#[from] InvalidMetric),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Unavailable(String),
}

/// Per-phenotype query parameters shared by the ranking tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhenotypeQuery {
    pub sigma: u32,
    pub geneset_size: String,
}

impl Default for PhenotypeQuery {
    fn default() -> Self {
        Self {
            sigma: 2,
            geneset_size: "small".to_string(),
        }
    }
}

struct SemanticIndex {
    embedder: Box<dyn Embedder>,
    index: PhenotypeSearchIndex,
}

/// Query service over the bio-index and the loaded graph
pub struct PortalTools {
    client: Box<dyn BioIndexClient>,
    store: Box<dyn GraphStore>,
    semantic: Option<SemanticIndex>,
}

impl PortalTools {
    pub fn new(client: Box<dyn BioIndexClient>, store: Box<dyn GraphStore>) -> Self {
        Self {
            client,
            store,
            semantic: None,
        }
    }

    /// Enable phenotype search by embedding every phenotype name
    pub fn enable_search(&mut self, embedder: Box<dyn Embedder>) -> Result<(), SearchError> {
        let records = fetch_phenotypes(self.client.as_ref())?;
        let index = PhenotypeSearchIndex::build(embedder.as_ref(), &records)?;
        info!(phenotypes = index.len(), "built phenotype search index");
        self.semantic = Some(SemanticIndex { embedder, index });
        Ok(())
    }

    pub fn search_enabled(&self) -> bool {
        self.semantic.is_some()
    }

    /// Phenotypes whose names are closest to `query`
    pub fn search_phenotypes(&self, query: &str, top_n: usize) -> Result<Vec<PhenotypeMatch>, SearchError> {
        let semantic = self.semantic.as_ref().ok_or_else(|| {
            SearchError::Unavailable("phenotype search requires an embedding model".to_string())
        })?;
        Ok(semantic.index.search(semantic.embedder.as_ref(), query, top_n)?)
    }

    /// Genes most strongly supporting a phenotype
    pub fn top_genes(
        &self,
        phenotype: &str,
        top_n: usize,
        metric: &str,
        query: &PhenotypeQuery,
    ) -> Result<Vec<TopGene>, SearchError> {
        let metric: GeneMetric = metric.parse()?;
        let records =
            fetch_gene_phenotypes(self.client.as_ref(), phenotype, query.sigma, &query.geneset_size)?;
        Ok(top_genes(&records, metric, top_n))
    }

    /// Gene sets most strongly associated with a phenotype
    pub fn gene_sets(
        &self,
        phenotype: &str,
        top_n: usize,
        metric: &str,
        query: &PhenotypeQuery,
    ) -> Result<Vec<GeneSetHit>, SearchError> {
        let records = fetch_gene_set_phenotypes(
            self.client.as_ref(),
            phenotype,
            query.sigma,
            &query.geneset_size,
        )?;
        Ok(top_gene_sets(&records, metric, top_n))
    }

    /// Factors of a phenotype, highest gene-set score first
    pub fn factors(&self, phenotype: &str, query: &PhenotypeQuery) -> Result<Vec<Factor>, SearchError> {
        let records = fetch_factors(self.client.as_ref(), phenotype, query.sigma, &query.geneset_size)?;
        Ok(rank_factors(&records))
    }

    /// Read-only SQL against the graph store
    pub fn graph_query(&self, sql: &str) -> Result<Vec<QueryRow>, SearchError> {
        Ok(self.store.read_query(sql)?)
    }
}
