//! Fetch → reconcile → upsert orchestration
//!
//! Phase 1 loads every phenotype and builds the phenotype index. Phase 2
//! walks that index and loads gene associations per phenotype. Phase 2
//! cannot start without the index from phase 1.

use crate::bioindex::{fetch_gene_phenotypes, fetch_phenotypes, BioIndexClient, BioIndexError};
use crate::config::AssociationConfig;
use crate::model::Entity;
use crate::reconcile::{
    reconcile_gene_associations, PhenotypeIndex, PhenotypeReconciler, ReconcileReport,
};
use crate::reference::ReferenceTables;
use crate::storage::{GraphStore, GraphWriter, StorageError, WriteSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Errors that abort a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    BioIndex(#[from] BioIndexError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Outcome of a full run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub phenotypes: ReconcileReport,
    pub written: WriteSummary,
    /// Distinct genes across all phenotypes
    pub genes: usize,
    pub associations: usize,
    pub skipped_associations: usize,
}

/// Single-pass loader over one bio-index client and one store
pub struct Pipeline<'a> {
    client: &'a dyn BioIndexClient,
    tables: &'a ReferenceTables,
    store: &'a dyn GraphStore,
    associations: AssociationConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        client: &'a dyn BioIndexClient,
        tables: &'a ReferenceTables,
        store: &'a dyn GraphStore,
        associations: AssociationConfig,
    ) -> Self {
        Self {
            client,
            tables,
            store,
            associations,
        }
    }

    /// Phase 1: load phenotypes and their studies
    pub fn load_phenotypes(&self) -> Result<(PhenotypeIndex, ReconcileReport, WriteSummary), PipelineError> {
        let records = fetch_phenotypes(self.client)?;
        info!(records = records.len(), "fetched phenotypes");

        let batch = PhenotypeReconciler::new(self.tables).reconcile_all(
            records
                .iter()
                .map(|r| (r.phenotype.as_str(), r.phenotype_name.as_str())),
        );
        info!(
            resolved = batch.report.resolved(),
            skipped = batch.report.skipped(),
            portal_fallbacks = batch.report.portal_fallbacks,
            duplicate_names = batch.report.duplicate_names,
            aliased_ids = batch.report.aliased_ids,
            studies = batch.report.studies,
            "reconciled phenotypes"
        );

        let written = GraphWriter::new(self.store).write(&batch.entities)?;
        Ok((batch.index, batch.report, written))
    }

    /// Phase 2: load gene associations for every indexed phenotype name.
    ///
    /// Returns the write summary, the number of distinct genes and the
    /// number of skipped records.
    pub fn load_associations(
        &self,
        index: &PhenotypeIndex,
    ) -> Result<(WriteSummary, usize, usize), PipelineError> {
        let writer = GraphWriter::new(self.store);
        let mut written = WriteSummary::default();
        let mut genes = std::collections::HashSet::new();
        let mut skipped = 0usize;

        for name in index.names() {
            let records = fetch_gene_phenotypes(
                self.client,
                name,
                self.associations.sigma,
                &self.associations.geneset_size,
            )?;
            let batch = reconcile_gene_associations(&records, index);
            skipped += batch.skipped;

            let mut entities: Vec<Entity> = Vec::with_capacity(batch.genes.len() + batch.associations.len());
            for gene in batch.genes {
                genes.insert(gene.id.clone());
                entities.push(gene.into());
            }
            entities.extend(batch.associations.into_iter().map(Entity::from));
            written += writer.write(&entities)?;
        }

        info!(
            genes = genes.len(),
            associations = written.associations,
            skipped,
            "loaded gene associations"
        );
        Ok((written, genes.len(), skipped))
    }

    /// Run both phases
    pub fn run(&self) -> Result<RunReport, PipelineError> {
        let started_at = Utc::now();

        let (index, phenotypes, mut written) = self.load_phenotypes()?;

        let (mut genes, mut skipped_associations) = (0, 0);
        if self.associations.enabled {
            let (assoc_written, gene_count, skipped) = self.load_associations(&index)?;
            written += assoc_written;
            genes = gene_count;
            skipped_associations = skipped;
        } else {
            info!("gene association loading disabled");
        }

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            phenotypes,
            associations: written.associations,
            written,
            genes,
            skipped_associations,
        })
    }
}
