//! Edge entities: gene/phenotype support associations

use super::property::Properties;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Predicate of gene → phenotype support associations
pub const SUPPORTS: &str = "PORTALLINK:supports";

/// Predicate of GWAS study → phenotype edges
pub const STUDIES: &str = "PORTALLINK:studies";

/// Stable edge identifier derived from its endpoints and predicate.
///
/// Re-deriving the same triple always yields the same id, so re-running a
/// load merges into the existing edge instead of creating a parallel one.
pub fn edge_id(subject: &str, predicate: &str, object: &str) -> String {
    let key = format!("{}|{}|{}", subject, predicate, object);
    Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()).to_string()
}

/// Log-odds support score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Support {
    pub log_odds: f64,
}

/// Scored association between a gene (subject) and a phenotype (object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportAssociation {
    pub id: String,
    pub subject: String,
    pub object: String,
    pub predicate: String,
    pub direct_support: Support,
    pub indirect_support: Support,
    pub combined_support: Support,
}

impl SupportAssociation {
    pub fn new(
        subject: impl Into<String>,
        object: impl Into<String>,
        direct: f64,
        indirect: f64,
        combined: f64,
    ) -> Self {
        let subject = subject.into();
        let object = object.into();
        Self {
            id: edge_id(&subject, SUPPORTS, &object),
            subject,
            object,
            predicate: SUPPORTS.to_string(),
            direct_support: Support { log_odds: direct },
            indirect_support: Support { log_odds: indirect },
            combined_support: Support { log_odds: combined },
        }
    }

    /// Score properties persisted on the edge
    pub fn properties(&self) -> Properties {
        let mut props = Properties::new();
        props.insert("direct_support.log_odds".into(), self.direct_support.log_odds.into());
        props.insert("indirect_support.log_odds".into(), self.indirect_support.log_odds.into());
        props.insert("combined_support.log_odds".into(), self.combined_support.log_odds.into());
        props
    }
}
