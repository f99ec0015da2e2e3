use crate::model::{Phenotype, NO_DESCRIPTION};
use crate::reference::OrphanetOntology;

/// Resolve an Orphanet identifier such as `Guttate_psoriasis_Orphanet_93460`.
///
/// The numeric id is the last `_`-separated token. The phenotype takes the
/// class URI as its id and the label from the source feed as its display
/// name; the ontology supplies description and cross-references.
pub fn reconcile_orphanet(
    raw: &str,
    display_name: &str,
    ontology: &OrphanetOntology,
) -> Option<Phenotype> {
    let numeric_id = raw.rsplit('_').next()?;
    if numeric_id.is_empty() {
        return None;
    }
    let class = ontology.get(numeric_id)?;

    Some(Phenotype {
        id: class.uri.clone(),
        name: raw.to_string(),
        display_name: display_name.to_string(),
        description: class
            .definition
            .clone()
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        has_xrefs: class.xrefs.clone(),
    })
}
