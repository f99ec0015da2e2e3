use crate::model::{Gwas, Phenotype, NO_DESCRIPTION};
use crate::reference::GcatStudyTable;
use std::collections::HashSet;

/// Resolve a normalized catalog trait such as `gcat_trait_body_mass_index`.
///
/// All catalog rows for the trait contribute: the first row's CURIE is the
/// phenotype id, every distinct CURIE becomes a cross-reference, and every
/// distinct `(accession, title)` pair becomes a study of the phenotype.
pub fn reconcile_gcat(
    raw: &str,
    display_name: &str,
    table: &GcatStudyTable,
) -> Option<(Phenotype, Vec<Gwas>)> {
    let mut rows = table.rows_for(raw).peekable();
    let id = rows.peek()?.curie.clone();

    let mut seen_xrefs = HashSet::new();
    let mut has_xrefs = Vec::new();
    let mut seen_studies = HashSet::new();
    let mut studies = Vec::new();

    for row in rows {
        if seen_xrefs.insert(row.curie.as_str()) {
            has_xrefs.push(row.curie.clone());
        }
        if let Some(accession) = row.accession.as_deref() {
            let title = row.title.as_deref().unwrap_or("");
            if seen_studies.insert((accession, title)) {
                studies.push(Gwas::from_accession(accession, title, id.clone()));
            }
        }
    }

    let phenotype = Phenotype {
        id,
        name: raw.to_string(),
        display_name: display_name.to_string(),
        description: NO_DESCRIPTION.to_string(),
        has_xrefs,
    };
    Some((phenotype, studies))
}
