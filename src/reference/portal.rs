//! Portal trait mapping table

use super::ReferenceResult;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct PortalTraitRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "EFO_id")]
    efo_id: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// One row of the portal trait mapping
#[derive(Debug, Clone, PartialEq)]
pub struct PortalTrait {
    pub name: String,
    pub id: String,
    /// EFO cross-references from the comma-separated `EFO_id` column
    pub efo_ids: Vec<String>,
    /// Free-text description; empty when the table has none
    pub description: String,
}

/// Portal trait mapping, looked up by trait name
#[derive(Debug, Default)]
pub struct PortalTraitTable {
    rows: Vec<PortalTrait>,
    by_name: HashMap<String, usize>,
}

impl PortalTraitTable {
    pub fn from_path(path: impl AsRef<Path>) -> ReferenceResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse the CSV table. Columns are matched by header name; rows
    /// without a `name` or `id` cannot be looked up and are skipped.
    pub fn from_reader<R: Read>(reader: R) -> ReferenceResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut table = Self::default();
        let mut skipped = 0usize;
        for result in rdr.deserialize::<PortalTraitRow>() {
            let row = match result {
                Ok(row) => row,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            let (name, id) = match (non_empty(row.name), non_empty(row.id)) {
                (Some(name), Some(id)) => (name, id),
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            let efo_ids = row
                .efo_id
                .as_deref()
                .map(split_xrefs)
                .unwrap_or_default();
            table.push(PortalTrait {
                name,
                id,
                efo_ids,
                description: row.description.unwrap_or_default(),
            });
        }

        if skipped > 0 {
            debug!(skipped, "skipped malformed portal trait rows");
        }
        Ok(table)
    }

    fn push(&mut self, row: PortalTrait) {
        let idx = self.rows.len();
        // First row wins on duplicate names
        self.by_name.entry(row.name.clone()).or_insert(idx);
        self.rows.push(row);
    }

    /// First row whose `name` equals the given trait name
    pub fn get(&self, name: &str) -> Option<&PortalTrait> {
        self.by_name.get(name).map(|&idx| &self.rows[idx])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<PortalTrait> for PortalTraitTable {
    fn from_iter<I: IntoIterator<Item = PortalTrait>>(iter: I) -> Self {
        let mut table = Self::default();
        for row in iter {
            table.push(row);
        }
        table
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_xrefs(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
