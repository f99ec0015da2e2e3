//! portal-graph CLI: loader, MCP server and graph inspection.
//!
//! Usage:
//!   portal-graph ingest [--config path] [--db path] [--skip-associations] [--reset]
//!   portal-graph mcp [--config path] [--db path] [--no-search]
//!   portal-graph query <sql> [--config path] [--db path]
//!   portal-graph stats [--config path] [--db path]
//!   portal-graph clear [--config path] [--db path]

use clap::{Parser, Subcommand};
use portal_graph::mcp::ToolDefaults;
use portal_graph::model::{label, STUDIES, SUPPORTS};
use portal_graph::search::PhenotypeQuery;
use portal_graph::{
    BioIndexHttpClient, GraphStore, OpenStore, Pipeline, PipelineConfig, PipelineError,
    PortalTools, ReferenceTables, SqliteStore,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_TRANSPORT: i32 = 3;

#[derive(Parser)]
#[command(
    name = "portal-graph",
    version,
    about = "Phenotype and gene-association graph loader for the bio-index"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, reconcile and load phenotypes and gene associations
    Ingest {
        /// Path to YAML configuration
        #[arg(long, default_value = "portal-graph.yaml")]
        config: PathBuf,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
        /// Load phenotypes only
        #[arg(long)]
        skip_associations: bool,
        /// Clear the graph before loading
        #[arg(long)]
        reset: bool,
    },
    /// Start the MCP (Model Context Protocol) server on stdio
    Mcp {
        /// Path to YAML configuration
        #[arg(long, default_value = "portal-graph.yaml")]
        config: PathBuf,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
        /// Do not load the embedding model
        #[arg(long)]
        no_search: bool,
    },
    /// Run a read-only SQL query and print rows as JSON
    Query {
        /// SQL statement
        sql: String,
        /// Path to YAML configuration
        #[arg(long, default_value = "portal-graph.yaml")]
        config: PathBuf,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Print node and edge counts
    Stats {
        /// Path to YAML configuration
        #[arg(long, default_value = "portal-graph.yaml")]
        config: PathBuf,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Remove every node and edge
    Clear {
        /// Path to YAML configuration
        #[arg(long, default_value = "portal-graph.yaml")]
        config: PathBuf,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Get the default database path (~/.local/share/portal-graph/portal-graph.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("portal-graph").join("portal-graph.db")
}


fn load_config(path: &Path) -> Result<PipelineConfig, i32> {
    PipelineConfig::load_or_default(path).map_err(|e| {
        eprintln!("Error: {}", e);
        EXIT_INPUT
    })
}

fn open_store(path: &Path) -> Result<SqliteStore, i32> {
    SqliteStore::open(path).map_err(|e| {
        eprintln!("Error: failed to open database at {}: {}", path.display(), e);
        EXIT_FAILURE
    })
}

fn http_client(config: &PipelineConfig) -> Result<BioIndexHttpClient, i32> {
    BioIndexHttpClient::new(
        config.bioindex.base_url.clone(),
        Duration::from_secs(config.bioindex.timeout_secs),
    )
    .map_err(|e| {
        eprintln!("Error: {}", e);
        EXIT_TRANSPORT
    })
}

fn cmd_ingest(config: &Path, db: Option<PathBuf>, skip_associations: bool, reset: bool) -> i32 {
    let mut config = match load_config(config) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if skip_associations {
        config.associations.enabled = false;
    }

    let tables = match ReferenceTables::load(
        &config.references.portal_traits,
        &config.references.gcat_studies,
        &config.references.orphanet_ontology,
    ) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: failed to load reference tables: {}", e);
            return EXIT_INPUT;
        }
    };

    let db_path = config.database_path(db, default_db_path);
    let store = match open_store(&db_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    if reset {
        if let Err(e) = store.clear() {
            eprintln!("Error: {}", e);
            return EXIT_FAILURE;
        }
    }

    let client = match http_client(&config) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let pipeline = Pipeline::new(&client, &tables, &store, config.associations.clone());
    match pipeline.run() {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_FAILURE
            }
        },
        Err(e @ PipelineError::BioIndex(_)) => {
            eprintln!("Error: {}", e);
            EXIT_TRANSPORT
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}

fn cmd_mcp(config: &Path, db: Option<PathBuf>, no_search: bool) -> i32 {
    let config = match load_config(config) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let store = match open_store(&config.database_path(db, default_db_path)) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let client = match http_client(&config) {
        Ok(c) => c,
        Err(code) => return code,
    };

    #[allow(unused_mut)]
    let mut tools = PortalTools::new(Box::new(client), Box::new(store));
    if !no_search {
        enable_search(&mut tools);
    }

    let defaults = ToolDefaults {
        search_top_n: config.search.top_n,
        query: PhenotypeQuery {
            sigma: config.associations.sigma,
            geneset_size: config.associations.geneset_size.clone(),
        },
    };
    portal_graph::mcp::run_mcp_server(Arc::new(tools), defaults)
}

#[cfg(feature = "embeddings")]
fn enable_search(tools: &mut PortalTools) {
    let embedder = match portal_graph::search::FastEmbedEmbedder::default_model() {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!("phenotype search disabled: {}", e);
            return;
        }
    };
    if let Err(e) = tools.enable_search(Box::new(embedder)) {
        tracing::warn!("phenotype search disabled: {}", e);
    }
}

#[cfg(not(feature = "embeddings"))]
fn enable_search(_tools: &mut PortalTools) {
    tracing::warn!("built without the `embeddings` feature; phenotype search disabled");
}

/// Open the graph named by `--db`, else by the config file, else the default
fn open_configured_store(config: &Path, db: Option<PathBuf>) -> Result<(SqliteStore, PathBuf), i32> {
    let config = load_config(config)?;
    let path = config.database_path(db, default_db_path);
    let store = open_store(&path)?;
    Ok((store, path))
}

fn cmd_query(sql: &str, config: &Path, db: Option<PathBuf>) -> i32 {
    let store = match open_configured_store(config, db) {
        Ok((s, _)) => s,
        Err(code) => return code,
    };
    match store.read_query(sql) {
        Ok(rows) => match serde_json::to_string_pretty(&rows) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_FAILURE
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}

fn cmd_stats(config: &Path, db: Option<PathBuf>) -> i32 {
    let store = match open_configured_store(config, db) {
        Ok((s, _)) => s,
        Err(code) => return code,
    };

    let counts = || -> portal_graph::StorageResult<Vec<(&'static str, usize)>> {
        Ok(vec![
            (label::PHENOTYPE, store.count_nodes(Some(label::PHENOTYPE))?),
            (label::GWAS, store.count_nodes(Some(label::GWAS))?),
            (label::GENE, store.count_nodes(Some(label::GENE))?),
            (STUDIES, store.count_edges(Some(STUDIES))?),
            (SUPPORTS, store.count_edges(Some(SUPPORTS))?),
        ])
    };
    match counts() {
        Ok(rows) => {
            println!("{:<24}  {:>10}", "KIND", "COUNT");
            println!("{}", "-".repeat(36));
            for (kind, count) in rows {
                println!("{:<24}  {:>10}", kind, count);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}

fn cmd_clear(config: &Path, db: Option<PathBuf>) -> i32 {
    let (store, path) = match open_configured_store(config, db) {
        Ok(opened) => opened,
        Err(code) => return code,
    };
    match store.clear() {
        Ok(()) => {
            println!("Cleared graph at {}", path.display());
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Ingest {
            config,
            db,
            skip_associations,
            reset,
        } => cmd_ingest(&config, db, skip_associations, reset),
        Commands::Mcp {
            config,
            db,
            no_search,
        } => cmd_mcp(&config, db, no_search),
        Commands::Query { sql, config, db } => cmd_query(&sql, &config, db),
        Commands::Stats { config, db } => cmd_stats(&config, db),
        Commands::Clear { config, db } => cmd_clear(&config, db),
    };
    std::process::exit(code);
}
