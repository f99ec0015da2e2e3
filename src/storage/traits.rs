//! Storage trait definitions

use crate::model::Properties;
use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Query is not read-only: {0}")]
    ReadOnlyQuery(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Identity of a node: its label plus its id within that label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef<'a> {
    pub label: &'a str,
    pub id: &'a str,
}

impl<'a> NodeRef<'a> {
    pub fn new(label: &'a str, id: &'a str) -> Self {
        Self { label, id }
    }
}

/// An edge to merge, identified by `id`
#[derive(Debug, Clone)]
pub struct EdgeWrite<'a> {
    pub id: &'a str,
    pub predicate: &'a str,
    pub source: NodeRef<'a>,
    pub target: NodeRef<'a>,
    pub properties: Properties,
}

/// A node as persisted
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNode {
    pub label: String,
    pub id: String,
    pub properties: Properties,
    pub updated_at: DateTime<Utc>,
}

/// An edge as persisted
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEdge {
    pub id: String,
    pub predicate: String,
    pub source_label: String,
    pub source_id: String,
    pub target_label: String,
    pub target_id: String,
    pub properties: Properties,
    pub updated_at: DateTime<Utc>,
}

/// A row returned by a read-only query, keyed by column name
pub type QueryRow = serde_json::Map<String, serde_json::Value>;

/// Exclusive write handle on a store, held for one batch of merges.
///
/// Every call commits on its own. A failing call leaves everything merged
/// before it in place.
pub trait GraphSession {
    /// Insert a node, or replace all properties of an existing one
    fn merge_node(&mut self, node: NodeRef<'_>, properties: &Properties) -> StorageResult<()>;

    /// Insert a property-less node if absent; never touches an existing one
    fn ensure_node(&mut self, node: NodeRef<'_>) -> StorageResult<()>;

    /// Insert an edge, or replace the predicate, endpoints and properties of
    /// an existing edge with the same id. Both endpoints must exist.
    fn merge_edge(&mut self, edge: &EdgeWrite<'_>) -> StorageResult<()>;
}

/// Trait for graph storage backends
///
/// Implementations must be thread-safe (Send + Sync) so a store can be
/// shared between the loader and the query service.
pub trait GraphStore: Send + Sync {
    /// Open a write session
    fn session(&self) -> StorageResult<Box<dyn GraphSession + '_>>;

    // === Node Operations ===

    /// Load a node by label and id
    fn load_node(&self, node: NodeRef<'_>) -> StorageResult<Option<StoredNode>>;

    /// Count nodes, optionally restricted to one label
    fn count_nodes(&self, label: Option<&str>) -> StorageResult<usize>;

    // === Edge Operations ===

    /// Load an edge by id
    fn load_edge(&self, id: &str) -> StorageResult<Option<StoredEdge>>;

    /// Edges originating from a node
    fn edges_from(&self, node: NodeRef<'_>) -> StorageResult<Vec<StoredEdge>>;

    /// Edges targeting a node
    fn edges_to(&self, node: NodeRef<'_>) -> StorageResult<Vec<StoredEdge>>;

    /// Count edges, optionally restricted to one predicate
    fn count_edges(&self, predicate: Option<&str>) -> StorageResult<usize>;

    // === Maintenance ===

    /// Remove every node and edge
    fn clear(&self) -> StorageResult<()>;

    /// Run a single read-only SQL statement, returning rows as JSON objects
    fn read_query(&self, sql: &str) -> StorageResult<Vec<QueryRow>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: GraphStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
