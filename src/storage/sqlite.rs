//! SQLite storage backend

use super::traits::{
    EdgeWrite, GraphSession, GraphStore, NodeRef, OpenStore, QueryRow, StorageError,
    StorageResult, StoredEdge, StoredNode,
};
use crate::model::Properties;
use chrono::{DateTime, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const EDGE_COLUMNS: &str = "id, predicate, source_label, source_id, target_label, target_id,
                            properties_json, updated_at";

/// SQLite-backed property graph
///
/// Nodes are keyed by `(label, id)`; edges by id, with foreign keys from
/// both endpoints to the node table. Thread-safe via internal mutex on the
/// connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS nodes (
                label TEXT NOT NULL,
                id TEXT NOT NULL,
                properties_json TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (label, id)
            );

            CREATE TABLE IF NOT EXISTS edges (
                id TEXT PRIMARY KEY,
                predicate TEXT NOT NULL,
                source_label TEXT NOT NULL,
                source_id TEXT NOT NULL,
                target_label TEXT NOT NULL,
                target_id TEXT NOT NULL,
                properties_json TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (source_label, source_id) REFERENCES nodes(label, id) ON DELETE CASCADE,
                FOREIGN KEY (target_label, target_id) REFERENCES nodes(label, id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_edges_source
                ON edges(source_label, source_id);
            CREATE INDEX IF NOT EXISTS idx_edges_target
                ON edges(target_label, target_id);
            CREATE INDEX IF NOT EXISTS idx_edges_predicate
                ON edges(predicate);

            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn row_to_node(row: &Row<'_>) -> rusqlite::Result<(String, String, String, String)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    }

    fn node_from_parts(
        label: String,
        id: String,
        properties_json: String,
        updated_at: String,
    ) -> StorageResult<StoredNode> {
        Ok(StoredNode {
            label,
            id,
            properties: serde_json::from_str(&properties_json)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }

    #[allow(clippy::type_complexity)]
    fn row_to_edge(
        row: &Row<'_>,
    ) -> rusqlite::Result<(String, String, String, String, String, String, String, String)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
        ))
    }

    #[allow(clippy::type_complexity)]
    fn edge_from_parts(
        parts: (String, String, String, String, String, String, String, String),
    ) -> StorageResult<StoredEdge> {
        let (id, predicate, source_label, source_id, target_label, target_id, props, updated) =
            parts;
        Ok(StoredEdge {
            id,
            predicate,
            source_label,
            source_id,
            target_label,
            target_id,
            properties: serde_json::from_str(&props)?,
            updated_at: parse_timestamp(&updated)?,
        })
    }

    fn query_edges(&self, sql: &str, node: NodeRef<'_>) -> StorageResult<Vec<StoredEdge>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![node.label, node.id], Self::row_to_edge)?;

        let mut edges = Vec::new();
        for row in rows {
            edges.push(Self::edge_from_parts(row?)?);
        }
        Ok(edges)
    }
}

fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::DateParse(e.to_string()))
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn value_to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(f) => serde_json::Value::from(f),
        ValueRef::Text(bytes) => serde_json::Value::from(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => serde_json::Value::from(format!("<blob {} bytes>", bytes.len())),
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Write session holding the store's connection lock
pub struct SqliteSession<'a> {
    conn: MutexGuard<'a, Connection>,
}

impl GraphSession for SqliteSession<'_> {
    fn merge_node(&mut self, node: NodeRef<'_>, properties: &Properties) -> StorageResult<()> {
        let properties_json = serde_json::to_string(properties)?;
        self.conn.execute(
            r#"
            INSERT INTO nodes (label, id, properties_json, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(label, id) DO UPDATE SET
                properties_json = excluded.properties_json,
                updated_at = excluded.updated_at
            "#,
            params![node.label, node.id, properties_json, now()],
        )?;
        Ok(())
    }

    fn ensure_node(&mut self, node: NodeRef<'_>) -> StorageResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO nodes (label, id, properties_json, updated_at)
            VALUES (?1, ?2, '{}', ?3)
            ON CONFLICT(label, id) DO NOTHING
            "#,
            params![node.label, node.id, now()],
        )?;
        Ok(())
    }

    fn merge_edge(&mut self, edge: &EdgeWrite<'_>) -> StorageResult<()> {
        let properties_json = serde_json::to_string(&edge.properties)?;
        self.conn.execute(
            r#"
            INSERT INTO edges (id, predicate, source_label, source_id, target_label, target_id,
                               properties_json, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                predicate = excluded.predicate,
                source_label = excluded.source_label,
                source_id = excluded.source_id,
                target_label = excluded.target_label,
                target_id = excluded.target_id,
                properties_json = excluded.properties_json,
                updated_at = excluded.updated_at
            "#,
            params![
                edge.id,
                edge.predicate,
                edge.source.label,
                edge.source.id,
                edge.target.label,
                edge.target.id,
                properties_json,
                now()
            ],
        )?;
        Ok(())
    }
}

impl GraphStore for SqliteStore {
    fn session(&self) -> StorageResult<Box<dyn GraphSession + '_>> {
        Ok(Box::new(SqliteSession {
            conn: self.conn.lock().unwrap(),
        }))
    }

    // === Node Operations ===

    fn load_node(&self, node: NodeRef<'_>) -> StorageResult<Option<StoredNode>> {
        let conn = self.conn.lock().unwrap();

        let row = conn
            .query_row(
                "SELECT label, id, properties_json, updated_at
                 FROM nodes WHERE label = ?1 AND id = ?2",
                params![node.label, node.id],
                Self::row_to_node,
            )
            .optional()?;

        match row {
            Some((label, id, props, updated)) => {
                Ok(Some(Self::node_from_parts(label, id, props, updated)?))
            }
            None => Ok(None),
        }
    }

    fn count_nodes(&self, label: Option<&str>) -> StorageResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = match label {
            Some(label) => conn.query_row(
                "SELECT COUNT(*) FROM nodes WHERE label = ?1",
                params![label],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))?,
        };
        Ok(count as usize)
    }

    // === Edge Operations ===

    fn load_edge(&self, id: &str) -> StorageResult<Option<StoredEdge>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT {} FROM edges WHERE id = ?1", EDGE_COLUMNS);
        let row = conn
            .query_row(&sql, params![id], Self::row_to_edge)
            .optional()?;

        match row {
            Some(parts) => Ok(Some(Self::edge_from_parts(parts)?)),
            None => Ok(None),
        }
    }

    fn edges_from(&self, node: NodeRef<'_>) -> StorageResult<Vec<StoredEdge>> {
        let sql = format!(
            "SELECT {} FROM edges WHERE source_label = ?1 AND source_id = ?2 ORDER BY id",
            EDGE_COLUMNS
        );
        self.query_edges(&sql, node)
    }

    fn edges_to(&self, node: NodeRef<'_>) -> StorageResult<Vec<StoredEdge>> {
        let sql = format!(
            "SELECT {} FROM edges WHERE target_label = ?1 AND target_id = ?2 ORDER BY id",
            EDGE_COLUMNS
        );
        self.query_edges(&sql, node)
    }

    fn count_edges(&self, predicate: Option<&str>) -> StorageResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = match predicate {
            Some(predicate) => conn.query_row(
                "SELECT COUNT(*) FROM edges WHERE predicate = ?1",
                params![predicate],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))?,
        };
        Ok(count as usize)
    }

    // === Maintenance ===

    fn clear(&self) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("DELETE FROM edges; DELETE FROM nodes;")?;
        Ok(())
    }

    fn read_query(&self, sql: &str) -> StorageResult<Vec<QueryRow>> {
        if !is_query_statement(sql) {
            return Err(StorageError::ReadOnlyQuery(sql.trim().to_string()));
        }
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql)?;
        // ATTACH, DETACH and transaction control report read-only too
        if !stmt.readonly() {
            return Err(StorageError::ReadOnlyQuery(sql.trim().to_string()));
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut obj = QueryRow::new();
            for (i, name) in columns.iter().enumerate() {
                obj.insert(name.clone(), value_to_json(row.get_ref(i)?));
            }
            out.push(obj);
        }
        Ok(out)
    }
}

/// Whether `sql` starts with a keyword that can only introduce a query
fn is_query_statement(sql: &str) -> bool {
    let keyword: String = sql
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    matches!(
        keyword.to_ascii_uppercase().as_str(),
        "SELECT" | "WITH" | "EXPLAIN" | "VALUES"
    )
}
