use super::PhenotypeIndex;
use crate::bioindex::GenePhenotypeRecord;
use crate::model::{Gene, SupportAssociation};
use std::collections::HashSet;
use tracing::warn;

/// Genes and associations reconciled from one batch of gene records
#[derive(Debug, Default)]
pub struct AssociationBatch {
    /// Distinct genes in first-seen order
    pub genes: Vec<Gene>,
    pub associations: Vec<SupportAssociation>,
    /// Records whose phenotype was never indexed
    pub skipped: usize,
}

/// Build gene nodes and support associations from raw gene/phenotype scores.
///
/// The object of each association is the reconciled phenotype id, never the
/// raw name. Records naming a phenotype absent from the index are dropped,
/// and their genes are only created if another record keeps them.
pub fn reconcile_gene_associations(
    records: &[GenePhenotypeRecord],
    index: &PhenotypeIndex,
) -> AssociationBatch {
    let mut batch = AssociationBatch::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for record in records {
        let Some(phenotype) = index.get(&record.phenotype) else {
            warn!(
                gene = %record.gene,
                phenotype = %record.phenotype,
                "association references unindexed phenotype, skipping"
            );
            batch.skipped += 1;
            continue;
        };

        if seen.insert(record.gene.as_str()) {
            batch.genes.push(Gene::from_symbol(record.gene.as_str()));
        }

        batch.associations.push(SupportAssociation::new(
            record.gene.as_str(),
            phenotype.id.as_str(),
            record.log_bf,
            record.prior,
            record.combined,
        ));
    }

    batch
}
