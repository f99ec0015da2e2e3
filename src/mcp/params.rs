//! MCP tool parameter structs with schemars-derived JSON schemas.

use schemars::JsonSchema;
use serde::Deserialize;

// ── Search params ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchPhenotypesParams {
    #[schemars(description = "Free-text phenotype description, e.g. 'type 2 diabetes'")]
    pub query: String,
    #[schemars(description = "Maximum number of matches (default 50)")]
    pub top_n: Option<usize>,
}

// ── Ranking params ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TopGenesParams {
    #[schemars(description = "Bio-index phenotype id, e.g. 'T2D'")]
    pub phenotype_id: String,
    #[schemars(description = "Number of genes to return (default 25)")]
    pub top_n: Option<usize>,
    #[schemars(description = "Ranking metric: 'combined', 'indirect' or 'direct' (default 'combined')")]
    pub metric: Option<String>,
    #[schemars(description = "Significance threshold (default 2)")]
    pub sigma: Option<u32>,
    #[schemars(description = "Gene-set size: 'small' or 'large' (default 'small')")]
    pub geneset_size: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GeneSetsParams {
    #[schemars(description = "Bio-index phenotype id, e.g. 'T2D'")]
    pub phenotype_id: String,
    #[schemars(description = "Number of gene sets to return (default 10)")]
    pub top_n: Option<usize>,
    #[schemars(description = "Metric column to rank by (default 'beta')")]
    pub metric: Option<String>,
    #[schemars(description = "Significance threshold (default 2)")]
    pub sigma: Option<u32>,
    #[schemars(description = "Gene-set size: 'small' or 'large' (default 'small')")]
    pub geneset_size: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FactorsParams {
    #[schemars(description = "Bio-index phenotype id, e.g. 'T2D'")]
    pub phenotype_id: String,
    #[schemars(description = "Significance threshold (default 2)")]
    pub sigma: Option<u32>,
    #[schemars(description = "Gene-set size: 'small' or 'large' (default 'small')")]
    pub geneset_size: Option<String>,
}

// ── Graph params ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GraphQueryParams {
    #[schemars(description = "A single read-only SQL statement over the nodes and edges tables")]
    pub sql: String,
}
