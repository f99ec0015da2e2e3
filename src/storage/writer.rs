//! Idempotent upsert of reconciled entities into a graph store

use super::traits::{EdgeWrite, GraphSession, GraphStore, NodeRef, StorageResult};
use crate::model::{edge_id, label, Entity, Properties, STUDIES};
use serde::Serialize;
use std::ops::AddAssign;
use tracing::debug;

/// Per-kind counts of entities written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub phenotypes: usize,
    pub genes: usize,
    pub studies: usize,
    pub associations: usize,
}

impl WriteSummary {
    pub fn total(&self) -> usize {
        self.phenotypes + self.genes + self.studies + self.associations
    }
}

impl AddAssign for WriteSummary {
    fn add_assign(&mut self, other: Self) {
        self.phenotypes += other.phenotypes;
        self.genes += other.genes;
        self.studies += other.studies;
        self.associations += other.associations;
    }
}

/// Writes entity batches through one store session per call.
///
/// Nodes are merged on `(label, id)` and edges on id, so writing the same
/// batch twice leaves the graph unchanged apart from timestamps. Edges
/// create property-less stubs for endpoints that do not exist yet; a stub
/// is filled in when its entity is written later.
pub struct GraphWriter<'a> {
    store: &'a dyn GraphStore,
}

impl<'a> GraphWriter<'a> {
    pub fn new(store: &'a dyn GraphStore) -> Self {
        Self { store }
    }

    /// Write a batch in order. The first failure aborts the call; entities
    /// written before it stay written.
    pub fn write(&self, entities: &[Entity]) -> StorageResult<WriteSummary> {
        let mut session = self.store.session()?;
        let mut summary = WriteSummary::default();

        for entity in entities {
            write_entity(session.as_mut(), entity, &mut summary)?;
        }

        debug!(
            phenotypes = summary.phenotypes,
            genes = summary.genes,
            studies = summary.studies,
            associations = summary.associations,
            "batch written"
        );
        Ok(summary)
    }
}

fn write_entity(
    session: &mut dyn GraphSession,
    entity: &Entity,
    summary: &mut WriteSummary,
) -> StorageResult<()> {
    match entity {
        Entity::Phenotype(p) => {
            session.merge_node(NodeRef::new(label::PHENOTYPE, &p.id), &p.properties())?;
            summary.phenotypes += 1;
        }
        Entity::Gene(g) => {
            session.merge_node(NodeRef::new(label::GENE, &g.id), &g.properties())?;
            summary.genes += 1;
        }
        Entity::Gwas(s) => {
            let study = NodeRef::new(label::GWAS, &s.id);
            let phenotype = NodeRef::new(label::PHENOTYPE, &s.phenotype);
            session.merge_node(study, &s.properties())?;
            session.ensure_node(phenotype)?;
            let id = edge_id(&s.id, STUDIES, &s.phenotype);
            session.merge_edge(&EdgeWrite {
                id: &id,
                predicate: STUDIES,
                source: study,
                target: phenotype,
                properties: Properties::new(),
            })?;
            summary.studies += 1;
        }
        Entity::SupportAssociation(a) => {
            let gene = NodeRef::new(label::GENE, &a.subject);
            let phenotype = NodeRef::new(label::PHENOTYPE, &a.object);
            session.ensure_node(gene)?;
            session.ensure_node(phenotype)?;
            session.merge_edge(&EdgeWrite {
                id: &a.id,
                predicate: &a.predicate,
                source: gene,
                target: phenotype,
                properties: a.properties(),
            })?;
            summary.associations += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gene, Gwas, Phenotype, SupportAssociation, NO_DESCRIPTION, SUPPORTS};
    use crate::storage::{OpenStore, SqliteStore};

    fn phenotype(id: &str, description: &str) -> Phenotype {
        Phenotype {
            id: id.into(),
            name: "raw".into(),
            display_name: "Display".into(),
            description: description.into(),
            has_xrefs: vec!["EFO:1".into()],
        }
    }

    fn batch() -> Vec<Entity> {
        vec![
            phenotype("EFO:1", NO_DESCRIPTION).into(),
            Gwas::from_accession("GCST001", "Study A", "EFO:1").into(),
            Gene::from_symbol("UMOD").into(),
            SupportAssociation::new("UMOD", "EFO:1", 1.0, 2.0, 3.0).into(),
        ]
    }

    #[test]
    fn writes_every_kind() {
        let store = SqliteStore::open_in_memory().unwrap();
        let summary = GraphWriter::new(&store).write(&batch()).unwrap();

        assert_eq!(
            summary,
            WriteSummary {
                phenotypes: 1,
                genes: 1,
                studies: 1,
                associations: 1
            }
        );
        assert_eq!(store.count_nodes(None).unwrap(), 3);
        assert_eq!(store.count_edges(Some(STUDIES)).unwrap(), 1);
        assert_eq!(store.count_edges(Some(SUPPORTS)).unwrap(), 1);

        let study_edges = store.edges_from(NodeRef::new(label::GWAS, "GCST:001")).unwrap();
        assert_eq!(study_edges[0].target_id, "EFO:1");
    }

    #[test]
    fn rewrite_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let writer = GraphWriter::new(&store);
        writer.write(&batch()).unwrap();
        writer.write(&batch()).unwrap();

        assert_eq!(store.count_nodes(None).unwrap(), 3);
        assert_eq!(store.count_edges(None).unwrap(), 2);
    }

    #[test]
    fn rewrite_refreshes_attributes() {
        let store = SqliteStore::open_in_memory().unwrap();
        let writer = GraphWriter::new(&store);
        writer.write(&[phenotype("EFO:1", "old").into()]).unwrap();
        writer.write(&[phenotype("EFO:1", "new").into()]).unwrap();

        let node = store
            .load_node(NodeRef::new(label::PHENOTYPE, "EFO:1"))
            .unwrap()
            .unwrap();
        assert_eq!(node.properties["description"].as_str(), Some("new"));
    }

    #[test]
    fn association_before_nodes_creates_stubs_filled_later() {
        let store = SqliteStore::open_in_memory().unwrap();
        let writer = GraphWriter::new(&store);
        writer
            .write(&[SupportAssociation::new("UMOD", "EFO:1", 1.0, 2.0, 3.0).into()])
            .unwrap();
        let stub = store.load_node(NodeRef::new(label::GENE, "UMOD")).unwrap().unwrap();
        assert!(stub.properties.is_empty());

        writer.write(&[Gene::from_symbol("UMOD").into()]).unwrap();
        let gene = store.load_node(NodeRef::new(label::GENE, "UMOD")).unwrap().unwrap();
        assert_eq!(gene.properties["symbol"].as_str(), Some("UMOD"));

        // Stubs never overwrite a filled node
        writer
            .write(&[SupportAssociation::new("UMOD", "EFO:1", 4.0, 5.0, 6.0).into()])
            .unwrap();
        let gene = store.load_node(NodeRef::new(label::GENE, "UMOD")).unwrap().unwrap();
        assert_eq!(gene.properties["symbol"].as_str(), Some("UMOD"));
        let edge = store.edges_from(NodeRef::new(label::GENE, "UMOD")).unwrap();
        assert_eq!(edge.len(), 1);
        assert_eq!(edge[0].properties["combined_support.log_odds"].as_f64(), Some(6.0));
    }
}
