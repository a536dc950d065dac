//! Embedding-based nearest-neighbour lookup over the documentation corpus.

use std::cmp::Ordering;

use docsync_core::{Diff, DocName};
use docsync_llm::Embedder;

use crate::error::PipelineError;
use crate::store::DocumentStore;

/// One embedding per document, in store order.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    entries: Vec<(DocName, Vec<f32>)>,
}

impl SimilarityIndex {
    /// Embed every document in `store` with a single call.
    pub fn build(store: &DocumentStore, embedder: &dyn Embedder) -> Result<Self, PipelineError> {
        let names: Vec<DocName> = store.names().cloned().collect();
        if names.is_empty() {
            return Ok(Self { entries: vec![] });
        }
        let texts: Vec<String> = store.documents().map(|d| d.content.clone()).collect();
        let vectors = embedder.embed(&texts)?;
        tracing::debug!("indexed {} documents", vectors.len());
        Ok(Self {
            entries: names.into_iter().zip(vectors).collect(),
        })
    }

    pub fn from_vectors(entries: Vec<(DocName, Vec<f32>)>) -> Self {
        Self { entries }
    }

    /// The `k` documents closest to `diff`, nearest first.
    pub fn nearest(
        &self,
        diff: &Diff,
        embedder: &dyn Embedder,
        k: usize,
    ) -> Result<Vec<DocName>, PipelineError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(vec![]);
        }
        let query = embedder
            .embed(&[diff.as_str().to_string()])?
            .into_iter()
            .next()
            .unwrap_or_default();
        Ok(self.rank(&query, k))
    }

    /// Rank by cosine similarity to `query`; ties go to the smaller name.
    pub fn rank(&self, query: &[f32], k: usize) -> Vec<DocName> {
        let mut scored: Vec<(f32, &DocName)> = self
            .entries
            .iter()
            .map(|(name, vector)| (cosine(query, vector), name))
            .collect();
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(b.1))
        });
        scored.into_iter().take(k).map(|(_, name)| name.clone()).collect()
    }
}

/// Cosine similarity; zero when either vector has no magnitude.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
