//! MCP server exposing phenotype search, gene ranking and graph queries
//! via the Model Context Protocol.
//!
//! Tools: search_phenotypes, pigean_top_genes, pigean_gene_sets,
//! pigean_factors, graph_query.

pub mod params;

use crate::search::{PhenotypeQuery, PortalTools, SearchError};
use params::*;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

const DEFAULT_TOP_GENES: usize = 25;
const DEFAULT_TOP_GENE_SETS: usize = 10;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ok_text(text: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn err_text(msg: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg)]))
}

fn json_text<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    match serde_json::to_string_pretty(value) {
        Ok(text) => ok_text(text),
        Err(e) => err_text(e.to_string()),
    }
}

/// Run a blocking service call off the async executor.
async fn call_blocking<T, F>(tools: &Arc<PortalTools>, f: F) -> Result<CallToolResult, McpError>
where
    T: Serialize + Send + 'static,
    F: FnOnce(&PortalTools) -> Result<T, SearchError> + Send + 'static,
{
    let tools = Arc::clone(tools);
    match tokio::task::spawn_blocking(move || f(&tools)).await {
        Ok(Ok(value)) => json_text(&value),
        Ok(Err(e)) => err_text(e.to_string()),
        Err(e) => err_text(format!("tool task failed: {}", e)),
    }
}

/// Fallbacks for optional tool parameters
#[derive(Debug, Clone)]
pub struct ToolDefaults {
    pub search_top_n: usize,
    pub query: PhenotypeQuery,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self {
            search_top_n: 50,
            query: PhenotypeQuery::default(),
        }
    }
}

impl ToolDefaults {
    fn query(&self, sigma: Option<u32>, geneset_size: Option<String>) -> PhenotypeQuery {
        PhenotypeQuery {
            sigma: sigma.unwrap_or(self.query.sigma),
            geneset_size: geneset_size.unwrap_or_else(|| self.query.geneset_size.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// PortalMcpServer
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PortalMcpServer {
    tools: Arc<PortalTools>,
    defaults: ToolDefaults,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl PortalMcpServer {
    pub fn new(tools: Arc<PortalTools>, defaults: ToolDefaults) -> Self {
        Self {
            tools,
            defaults,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Find portal phenotypes whose names are semantically closest to a free-text query")]
    async fn search_phenotypes(
        &self,
        Parameters(p): Parameters<SearchPhenotypesParams>,
    ) -> Result<CallToolResult, McpError> {
        let top_n = p.top_n.unwrap_or(self.defaults.search_top_n);
        call_blocking(&self.tools, move |t| t.search_phenotypes(&p.query, top_n)).await
    }

    #[tool(description = "Top genes for a phenotype ranked by combined, indirect (gene-set prior) or direct (GWAS) support")]
    async fn pigean_top_genes(
        &self,
        Parameters(p): Parameters<TopGenesParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = self.defaults.query(p.sigma, p.geneset_size);
        let top_n = p.top_n.unwrap_or(DEFAULT_TOP_GENES);
        let metric = p.metric.unwrap_or_else(|| "combined".to_string());
        call_blocking(&self.tools, move |t| {
            t.top_genes(&p.phenotype_id, top_n, &metric, &query)
        })
        .await
    }

    #[tool(description = "Top gene sets for a phenotype ranked by a metric column such as beta")]
    async fn pigean_gene_sets(
        &self,
        Parameters(p): Parameters<GeneSetsParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = self.defaults.query(p.sigma, p.geneset_size);
        let top_n = p.top_n.unwrap_or(DEFAULT_TOP_GENE_SETS);
        let metric = p.metric.unwrap_or_else(|| "beta".to_string());
        call_blocking(&self.tools, move |t| {
            t.gene_sets(&p.phenotype_id, top_n, &metric, &query)
        })
        .await
    }

    #[tool(description = "Factors of a phenotype with their top genes and gene sets, highest gene-set score first")]
    async fn pigean_factors(
        &self,
        Parameters(p): Parameters<FactorsParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = self.defaults.query(p.sigma, p.geneset_size);
        call_blocking(&self.tools, move |t| t.factors(&p.phenotype_id, &query)).await
    }

    #[tool(description = "Run a read-only SQL query against the loaded phenotype/gene graph (tables: nodes, edges)")]
    async fn graph_query(
        &self,
        Parameters(p): Parameters<GraphQueryParams>,
    ) -> Result<CallToolResult, McpError> {
        call_blocking(&self.tools, move |t| t.graph_query(&p.sql)).await
    }
}

#[tool_handler]
impl ServerHandler for PortalMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Portal graph MCP server: phenotype search, PIGEAN gene/gene-set/factor rankings, read-only graph queries"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Serve the tools on stdio until the client disconnects.
///
/// The blocking HTTP client inside `tools` must not be dropped on the
/// executor; the last reference is released after the runtime shuts down.
pub fn run_mcp_server(tools: Arc<PortalTools>, defaults: ToolDefaults) -> i32 {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return 1;
        }
    };

    let server = PortalMcpServer::new(Arc::clone(&tools), defaults);
    let search = tools.search_enabled();
    let code = rt.block_on(async move {
        info!(search, "portal-graph mcp server starting on stdio");

        let service = match server.serve(rmcp::transport::stdio()).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("failed to start MCP server: {}", e);
                return 1;
            }
        };

        if let Err(e) = service.waiting().await {
            eprintln!("MCP server error: {}", e);
            return 1;
        }

        0
    });
    drop(rt);
    drop(tools);
    code
}
