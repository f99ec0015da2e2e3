//! Phenotype and gene-association reconciliation
//!
//! Raw phenotype identifiers from the bio-index come from three sources that
//! use incompatible naming conventions. [`classify`] routes each identifier
//! to the reconciler for its source, and [`PhenotypeReconciler`] turns a full
//! listing into graph entities plus a [`PhenotypeIndex`] used to resolve
//! gene associations afterwards.

mod association;
mod gcat;
mod index;
mod orphanet;
mod portal;

pub use association::{reconcile_gene_associations, AssociationBatch};
pub use gcat::reconcile_gcat;
pub use index::{IndexOutcome, PhenotypeIndex};
pub use orphanet::reconcile_orphanet;
pub use portal::reconcile_portal;

use crate::model::{Entity, Phenotype};
use crate::reference::ReferenceTables;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Origin of a raw phenotype identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    Orphanet,
    GcatTrait,
    Portal,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Orphanet => write!(f, "ORPHANET"),
            SourceKind::GcatTrait => write!(f, "GCAT_TRAIT"),
            SourceKind::Portal => write!(f, "PORTAL"),
        }
    }
}

/// Classify a raw identifier by substring. The Orphanet marker is checked
/// first, so an identifier carrying both markers is an Orphanet one.
pub fn classify(identifier: &str) -> SourceKind {
    if identifier.contains("Orphanet") {
        SourceKind::Orphanet
    } else if identifier.contains("gcat_trait") {
        SourceKind::GcatTrait
    } else {
        SourceKind::Portal
    }
}

/// Per-source outcome counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceCounts {
    pub resolved: usize,
    pub skipped: usize,
}

/// Summary of a phenotype reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub orphanet: SourceCounts,
    pub gcat: SourceCounts,
    pub portal: SourceCounts,
    /// Portal phenotypes missing from the trait table
    pub portal_fallbacks: usize,
    pub duplicate_names: usize,
    pub aliased_ids: usize,
    pub studies: usize,
}

impl ReconcileReport {
    fn counts_mut(&mut self, kind: SourceKind) -> &mut SourceCounts {
        match kind {
            SourceKind::Orphanet => &mut self.orphanet,
            SourceKind::GcatTrait => &mut self.gcat,
            SourceKind::Portal => &mut self.portal,
        }
    }

    pub fn resolved(&self) -> usize {
        self.orphanet.resolved + self.gcat.resolved + self.portal.resolved
    }

    pub fn skipped(&self) -> usize {
        self.orphanet.skipped + self.gcat.skipped + self.portal.skipped
    }
}

/// Output of [`PhenotypeReconciler::reconcile_all`]
#[derive(Debug, Default)]
pub struct PhenotypeBatch {
    pub entities: Vec<Entity>,
    pub index: PhenotypeIndex,
    pub report: ReconcileReport,
}

/// Dispatches raw phenotype identifiers to the per-source reconcilers
pub struct PhenotypeReconciler<'a> {
    tables: &'a ReferenceTables,
}

impl<'a> PhenotypeReconciler<'a> {
    pub fn new(tables: &'a ReferenceTables) -> Self {
        Self { tables }
    }

    /// Reconcile one raw identifier.
    ///
    /// Returns the phenotype and any studies that reference it, or `None`
    /// when the source cannot resolve the identifier. Portal identifiers
    /// always resolve.
    pub fn reconcile(&self, raw: &str, display_name: &str) -> Option<(Phenotype, Vec<Entity>)> {
        match classify(raw) {
            SourceKind::Orphanet => {
                reconcile_orphanet(raw, display_name, &self.tables.orphanet).map(|p| (p, Vec::new()))
            }
            SourceKind::GcatTrait => reconcile_gcat(raw, display_name, &self.tables.gcat)
                .map(|(p, studies)| (p, studies.into_iter().map(Entity::from).collect())),
            SourceKind::Portal => {
                Some((reconcile_portal(raw, display_name, &self.tables.portal), Vec::new()))
            }
        }
    }

    /// Reconcile a full listing of `(raw identifier, display name)` pairs.
    ///
    /// Each phenotype is emitted before the studies that reference it. A
    /// name seen twice is dropped; a second name resolving to an already
    /// indexed id is recorded as an alias and emits nothing new.
    pub fn reconcile_all<'r, I>(&self, records: I) -> PhenotypeBatch
    where
        I: IntoIterator<Item = (&'r str, &'r str)>,
    {
        let mut batch = PhenotypeBatch::default();

        for (raw, display_name) in records {
            let kind = classify(raw);
            let Some((phenotype, studies)) = self.reconcile(raw, display_name) else {
                debug!(phenotype = raw, source = %kind, "unresolved phenotype skipped");
                batch.report.counts_mut(kind).skipped += 1;
                continue;
            };

            match batch.index.insert(phenotype.clone()) {
                IndexOutcome::Inserted => {
                    batch.report.counts_mut(kind).resolved += 1;
                    if kind == SourceKind::Portal
                        && phenotype.description == crate::model::PORTAL_FALLBACK_DESCRIPTION
                    {
                        batch.report.portal_fallbacks += 1;
                    }
                    batch.report.studies += studies.len();
                    batch.entities.push(Entity::Phenotype(phenotype));
                    batch.entities.extend(studies);
                }
                IndexOutcome::AliasedId => {
                    debug!(phenotype = raw, id = %phenotype.id, "phenotype id already indexed, aliasing");
                    batch.report.counts_mut(kind).resolved += 1;
                    batch.report.aliased_ids += 1;
                    batch.report.studies += studies.len();
                    batch.entities.extend(studies);
                }
                IndexOutcome::DuplicateName => {
                    debug!(phenotype = raw, "duplicate phenotype name skipped");
                    batch.report.duplicate_names += 1;
                }
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gwas, PORTAL_ID_PREFIX};
    use crate::reference::{GcatStudy, OrphanetClass, PortalTrait};

    fn tables() -> ReferenceTables {
        ReferenceTables {
            portal: [PortalTrait {
                name: "T2D".into(),
                id: "T2D".into(),
                efo_ids: vec!["EFO:0001360".into()],
                description: "Type 2 diabetes".into(),
            }]
            .into_iter()
            .collect(),
            gcat: [
                GcatStudy {
                    trait_name: "gcat_trait_type_2_diabetes".into(),
                    curie: "EFO:0001360".into(),
                    accession: Some("GCST10".into()),
                    title: Some("T2D study".into()),
                },
                GcatStudy {
                    trait_name: "gcat_trait_bmi".into(),
                    curie: "EFO:0004340".into(),
                    accession: Some("GCST11".into()),
                    title: Some("BMI study".into()),
                },
            ]
            .into_iter()
            .collect(),
            orphanet: [OrphanetClass {
                uri: "http://www.orpha.net/ORDO/Orphanet_558".into(),
                label: "Marfan syndrome".into(),
                definition: None,
                xrefs: vec![],
            }]
            .into_iter()
            .collect(),
        }
    }

    #[test]
    fn classification_is_total_and_ordered() {
        assert_eq!(classify("Marfan_Orphanet_558"), SourceKind::Orphanet);
        assert_eq!(classify("gcat_trait_bmi"), SourceKind::GcatTrait);
        assert_eq!(classify("gcat_trait_Orphanet_1"), SourceKind::Orphanet);
        assert_eq!(classify("T2D"), SourceKind::Portal);
        assert_eq!(classify(""), SourceKind::Portal);
        assert_eq!(SourceKind::GcatTrait.to_string(), "GCAT_TRAIT");
    }

    #[test]
    fn reconcile_all_orders_phenotype_before_studies() {
        let tables = tables();
        let batch = PhenotypeReconciler::new(&tables)
            .reconcile_all([("gcat_trait_bmi", "BMI"), ("Marfan_Orphanet_558", "Marfan")]);

        assert_eq!(batch.entities.len(), 3);
        assert!(matches!(&batch.entities[0], Entity::Phenotype(p) if p.id == "EFO:0004340"));
        assert!(matches!(&batch.entities[1], Entity::Gwas(Gwas { phenotype, .. }) if phenotype == "EFO:0004340"));
        assert!(matches!(&batch.entities[2], Entity::Phenotype(p) if p.display_name == "Marfan"));
        assert_eq!(batch.report.gcat.resolved, 1);
        assert_eq!(batch.report.orphanet.resolved, 1);
        assert_eq!(batch.report.studies, 1);
    }

    #[test]
    fn unresolved_records_are_counted_not_emitted() {
        let tables = tables();
        let batch = PhenotypeReconciler::new(&tables).reconcile_all([
            ("gcat_trait_unknown", "?"),
            ("Rare_Orphanet_1", "?"),
            ("eGFR", "eGFR"),
        ]);
        assert_eq!(batch.report.gcat.skipped, 1);
        assert_eq!(batch.report.orphanet.skipped, 1);
        assert_eq!(batch.report.portal.resolved, 1);
        assert_eq!(batch.report.portal_fallbacks, 1);
        assert_eq!(batch.report.skipped(), 2);
        assert_eq!(batch.entities.len(), 1);
        assert!(batch.index.get("gcat_trait_unknown").is_none());
    }

    #[test]
    fn duplicate_names_and_aliased_ids_keep_ids_unique() {
        let tables = tables();
        let batch = PhenotypeReconciler::new(&tables).reconcile_all([
            ("T2D", "Type 2 diabetes"),
            ("T2D", "Again"),
            ("gcat_trait_type_2_diabetes", "T2D (catalog)"),
            ("gcat_trait_bmi", "BMI"),
        ]);

        assert_eq!(batch.report.duplicate_names, 1);
        assert_eq!(batch.report.aliased_ids, 0);

        let phenotype_ids: Vec<_> = batch
            .entities
            .iter()
            .filter_map(|e| match e {
                Entity::Phenotype(p) => Some(p.id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            phenotype_ids,
            vec![
                format!("{}T2D", PORTAL_ID_PREFIX).as_str(),
                "EFO:0001360",
                "EFO:0004340"
            ]
        );
        assert_eq!(batch.index.get("T2D").unwrap().display_name, "Type 2 diabetes");
    }

    #[test]
    fn second_name_for_same_id_becomes_alias() {
        let mut tables = tables();
        tables.gcat = [
            GcatStudy {
                trait_name: "gcat_trait_bmi".into(),
                curie: "EFO:0004340".into(),
                accession: Some("GCST11".into()),
                title: Some("BMI study".into()),
            },
            GcatStudy {
                trait_name: "gcat_trait_body_mass_index".into(),
                curie: "EFO:0004340".into(),
                accession: Some("GCST12".into()),
                title: Some("Other BMI study".into()),
            },
        ]
        .into_iter()
        .collect();

        let batch = PhenotypeReconciler::new(&tables)
            .reconcile_all([("gcat_trait_bmi", "BMI"), ("gcat_trait_body_mass_index", "BMI")]);

        assert_eq!(batch.report.aliased_ids, 1);
        let phenotypes = batch
            .entities
            .iter()
            .filter(|e| matches!(e, Entity::Phenotype(_)))
            .count();
        let studies = batch
            .entities
            .iter()
            .filter(|e| matches!(e, Entity::Gwas(_)))
            .count();
        assert_eq!(phenotypes, 1);
        assert_eq!(studies, 2);
        assert_eq!(
            batch.index.get("gcat_trait_body_mass_index").unwrap().id,
            "EFO:0004340"
        );
    }
}
