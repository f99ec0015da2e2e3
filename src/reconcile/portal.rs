use crate::model::{Phenotype, NO_DESCRIPTION, PORTAL_FALLBACK_DESCRIPTION, PORTAL_ID_PREFIX};
use crate::reference::PortalTraitTable;

/// Resolve a portal trait name against the trait mapping table.
///
/// Never fails: a name missing from the table still yields a phenotype,
/// with a fallback description and no cross-references.
pub fn reconcile_portal(raw: &str, display_name: &str, table: &PortalTraitTable) -> Phenotype {
    match table.get(raw) {
        Some(row) => Phenotype {
            id: format!("{}{}", PORTAL_ID_PREFIX, row.id),
            name: raw.to_string(),
            display_name: display_name.to_string(),
            description: if row.description.is_empty() {
                NO_DESCRIPTION.to_string()
            } else {
                row.description.clone()
            },
            has_xrefs: row.efo_ids.clone(),
        },
        None => Phenotype {
            id: format!("{}{}", PORTAL_ID_PREFIX, raw),
            name: raw.to_string(),
            display_name: display_name.to_string(),
            description: PORTAL_FALLBACK_DESCRIPTION.to_string(),
            has_xrefs: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::PortalTrait;

    fn table() -> PortalTraitTable {
        [
            PortalTrait {
                name: "AM_broad_heavy".into(),
                id: "AM_broad_heavy".into(),
                efo_ids: vec!["EFO:0007878".into(), "EFO:0004329".into()],
                description: "Heavy alcohol use".into(),
            },
            PortalTrait {
                name: "BMI".into(),
                id: "BMI_v2".into(),
                efo_ids: vec![],
                description: String::new(),
            },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn hit_uses_table_row() {
        let p = reconcile_portal("AM_broad_heavy", "Alcohol", &table());
        assert_eq!(p.id, "PORTAL.TRAIT:AM_broad_heavy");
        assert_eq!(p.has_xrefs, vec!["EFO:0007878", "EFO:0004329"]);
        assert_eq!(p.description, "Heavy alcohol use");
        assert_eq!(p.display_name, "Alcohol");
    }

    #[test]
    fn hit_id_comes_from_id_column() {
        let p = reconcile_portal("BMI", "Body mass index", &table());
        assert_eq!(p.id, "PORTAL.TRAIT:BMI_v2");
        assert_eq!(p.description, NO_DESCRIPTION);
    }

    #[test]
    fn miss_falls_back() {
        let p = reconcile_portal("eGFRcrcys", "eGFR", &table());
        assert_eq!(p.id, "PORTAL.TRAIT:eGFRcrcys");
        assert_eq!(p.description, PORTAL_FALLBACK_DESCRIPTION);
        assert!(p.has_xrefs.is_empty());
    }
}
