//! Semantic search over phenotype names

use super::embedding::{cosine_similarity, Embedder, EmbeddingError};
use crate::bioindex::PhenotypeRecord;
use serde::Serialize;

const EMBED_BATCH: usize = 256;

/// A phenotype ranked against a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhenotypeMatch {
    pub id: String,
    pub name: String,
    pub cosine_similarity: f32,
}

/// Embedded phenotype names
pub struct PhenotypeSearchIndex {
    ids: Vec<String>,
    names: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl PhenotypeSearchIndex {
    /// Embed every phenotype name
    pub fn build(embedder: &dyn Embedder, records: &[PhenotypeRecord]) -> Result<Self, EmbeddingError> {
        let mut vectors = Vec::with_capacity(records.len());
        for chunk in records.chunks(EMBED_BATCH) {
            let texts: Vec<&str> = chunk.iter().map(|r| r.phenotype_name.as_str()).collect();
            let embedded = embedder.embed_batch(&texts)?;
            if embedded.len() != texts.len() {
                return Err(EmbeddingError::ModelError(format!(
                    "expected {} vectors, got {}",
                    texts.len(),
                    embedded.len()
                )));
            }
            vectors.extend(embedded);
        }

        Ok(Self {
            ids: records.iter().map(|r| r.phenotype.clone()).collect(),
            names: records.iter().map(|r| r.phenotype_name.clone()).collect(),
            vectors,
        })
    }

    /// The `top_n` phenotypes closest to `query`, most similar first
    pub fn search(
        &self,
        embedder: &dyn Embedder,
        query: &str,
        top_n: usize,
    ) -> Result<Vec<PhenotypeMatch>, EmbeddingError> {
        let query = embedder.embed(query)?;
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_similarity(&query, v)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_n);

        Ok(scored
            .into_iter()
            .map(|(i, score)| PhenotypeMatch {
                id: self.ids[i].clone(),
                name: self.names[i].clone(),
                cosine_similarity: score,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MockEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl Embedder for MockEmbedder {
        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts
                .iter()
                .map(|t| self.vectors.get(*t).cloned().unwrap_or_else(|| vec![0.0; 3]))
                .collect())
        }
    }

    fn record(id: &str, name: &str) -> PhenotypeRecord {
        PhenotypeRecord {
            phenotype: id.into(),
            phenotype_name: name.into(),
            trait_group: None,
            display_group: None,
        }
    }

    fn embedder() -> MockEmbedder {
        let mut vectors = HashMap::new();
        vectors.insert("Type 2 diabetes".to_string(), vec![1.0, 0.1, 0.0]);
        vectors.insert("Type 1 diabetes".to_string(), vec![0.8, 0.5, 0.0]);
        vectors.insert("Body mass index".to_string(), vec![0.0, 0.0, 1.0]);
        vectors.insert("diabetes".to_string(), vec![1.0, 0.0, 0.0]);
        MockEmbedder { vectors }
    }

    #[test]
    fn results_sorted_descending_and_truncated() {
        let embedder = embedder();
        let index = PhenotypeSearchIndex::build(
            &embedder,
            &[
                record("BMI", "Body mass index"),
                record("T1D", "Type 1 diabetes"),
                record("T2D", "Type 2 diabetes"),
            ],
        )
        .unwrap();
        assert_eq!(index.len(), 3);

        let hits = index.search(&embedder, "diabetes", 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "T2D");
        assert_eq!(hits[1].id, "T1D");
        assert!(hits[0].cosine_similarity >= hits[1].cosine_similarity);

        let all = index.search(&embedder, "diabetes", 50).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].name, "Body mass index");
    }
}
