//! GWAS-catalog studies table

use super::ReferenceResult;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Prefix of normalized GWAS-catalog trait names
pub const TRAIT_PREFIX: &str = "gcat_trait_";

#[derive(Debug, Deserialize)]
struct GcatRow {
    #[serde(default, rename = "MAPPED_TRAIT")]
    mapped_trait: Option<String>,
    #[serde(default, rename = "MAPPED_TRAIT_URI")]
    mapped_trait_uri: Option<String>,
    #[serde(default, rename = "STUDY ACCESSION")]
    accession: Option<String>,
    #[serde(default, rename = "STUDY")]
    title: Option<String>,
}

/// A preprocessed catalog row
#[derive(Debug, Clone, PartialEq)]
pub struct GcatStudy {
    /// Normalized trait name, e.g. `gcat_trait_body_mass_index`
    pub trait_name: String,
    /// Ontology CURIE of the mapped trait, e.g. `EFO:0004340`
    pub curie: String,
    pub accession: Option<String>,
    pub title: Option<String>,
}

/// Normalize a catalog trait name: spaces become underscores, characters
/// outside `[A-Za-z0-9_]` are dropped, and the result is prefixed with
/// `gcat_trait_`. Returns `None` when nothing is left.
pub fn normalize_trait_name(raw: &str) -> Option<String> {
    let body: String = raw
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if body.is_empty() {
        return None;
    }
    Some(format!("{}{}", TRAIT_PREFIX, body))
}

/// Turn a trait URI into a CURIE: keep the final path segment and replace
/// `_` with `:`. `http://www.ebi.ac.uk/efo/EFO_0004340` becomes `EFO:0004340`.
pub fn normalize_curie(raw: &str) -> Option<String> {
    let segment = raw.trim().rsplit('/').next().unwrap_or("");
    if segment.is_empty() {
        return None;
    }
    Some(segment.replace('_', ":"))
}

/// Catalog rows grouped by normalized trait name
#[derive(Debug, Default)]
pub struct GcatStudyTable {
    rows: Vec<GcatStudy>,
    by_trait: HashMap<String, Vec<usize>>,
}

impl GcatStudyTable {
    pub fn from_path(path: impl AsRef<Path>) -> ReferenceResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse the tab-separated export. Quote characters are literal in
    /// study titles, so quoting is disabled.
    pub fn from_reader<R: Read>(reader: R) -> ReferenceResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .quoting(false)
            .flexible(true)
            .from_reader(reader);

        let mut table = Self::default();
        let mut skipped = 0usize;
        for result in rdr.deserialize::<GcatRow>() {
            let row = match result {
                Ok(row) => row,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            let trait_name = row.mapped_trait.as_deref().and_then(normalize_trait_name);
            let curie = row.mapped_trait_uri.as_deref().and_then(normalize_curie);
            match (trait_name, curie) {
                (Some(trait_name), Some(curie)) => table.push(GcatStudy {
                    trait_name,
                    curie,
                    accession: non_empty(row.accession),
                    title: non_empty(row.title),
                }),
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(skipped, "skipped catalog rows without a mapped trait");
        }
        Ok(table)
    }

    fn push(&mut self, row: GcatStudy) {
        let idx = self.rows.len();
        self.by_trait
            .entry(row.trait_name.clone())
            .or_default()
            .push(idx);
        self.rows.push(row);
    }

    /// All rows for a normalized trait name, in file order
    pub fn rows_for<'a>(&'a self, trait_name: &str) -> impl Iterator<Item = &'a GcatStudy> + 'a {
        self.by_trait
            .get(trait_name)
            .map(|idxs| idxs.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&idx| &self.rows[idx])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<GcatStudy> for GcatStudyTable {
    fn from_iter<I: IntoIterator<Item = GcatStudy>>(iter: I) -> Self {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_name_normalization() {
        assert_eq!(
            normalize_trait_name("body mass index").as_deref(),
            Some("gcat_trait_body_mass_index")
        );
        assert_eq!(
            normalize_trait_name("response to platinum-based agent, (x)").as_deref(),
            Some("gcat_trait_response_to_platinumbased_agent_x")
        );
        assert_eq!(normalize_trait_name("---"), None);
        assert_eq!(normalize_trait_name(""), None);
    }

    #[test]
    fn curie_normalization() {
        assert_eq!(
            normalize_curie(" http://www.ebi.ac.uk/efo/EFO_0004340 ").as_deref(),
            Some("EFO:0004340")
        );
        assert_eq!(
            normalize_curie("http://purl.obolibrary.org/obo/OBA_1001000").as_deref(),
            Some("OBA:1001000")
        );
        assert_eq!(normalize_curie("http://example.org/"), None);
        assert_eq!(normalize_curie("   "), None);
    }

    #[test]
    fn rows_grouped_by_trait_in_file_order() {
        let tsv = "STUDY ACCESSION\tSTUDY\tMAPPED_TRAIT\tMAPPED_TRAIT_URI\n\
                   GCST1\tFirst \"quoted\" study\tbody mass index\thttp://www.ebi.ac.uk/efo/EFO_0004340\n\
                   GCST2\tSecond\tbody mass index\thttp://purl.obolibrary.org/obo/OBA_1001000\n\
                   GCST3\tNo trait\t\thttp://www.ebi.ac.uk/efo/EFO_1\n\
                   GCST4\tNo uri\tsomething\t\n";
        let table = GcatStudyTable::from_reader(tsv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);

        let rows: Vec<_> = table.rows_for("gcat_trait_body_mass_index").collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].curie, "EFO:0004340");
        assert_eq!(rows[0].title.as_deref(), Some("First \"quoted\" study"));
        assert_eq!(rows[1].accession.as_deref(), Some("GCST2"));

        assert_eq!(table.rows_for("gcat_trait_something").count(), 0);
    }
}
