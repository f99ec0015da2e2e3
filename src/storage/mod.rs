//! Graph storage
//!
//! Backends implement the `GraphStore` trait. The primary implementation is
//! `SqliteStore`, a property graph in a single SQLite file. `GraphWriter`
//! upserts reconciled entity batches through a store session.

mod sqlite;
mod traits;
mod writer;

pub use sqlite::{SqliteSession, SqliteStore};
pub use traits::{
    EdgeWrite, GraphSession, GraphStore, NodeRef, OpenStore, QueryRow, StorageError,
    StorageResult, StoredEdge, StoredNode,
};
pub use writer::{GraphWriter, WriteSummary};
