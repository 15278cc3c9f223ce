//! Similarity retrieval over the chunk index.
//!
//! [`VectorRetriever`] embeds the query with the same configured embedder
//! used at ingestion, scores every stored chunk by cosine similarity, and
//! returns the top k. The [`ContextRetriever`] trait is the seam the query
//! pipeline depends on, so tests can substitute a canned retriever.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::embedding::{cosine_similarity, embed_query, Embedder};
use crate::models::RetrievedChunk;
use crate::store;

/// Returns the chunks most similar to a query, best first.
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    /// Up to `k` chunks ordered by decreasing similarity. Fewer than `k` when
    /// the index is small; empty (not an error) when the index is empty.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>>;
}

/// Production retriever over the SQLite index.
pub struct VectorRetriever<'a> {
    pool: &'a SqlitePool,
    embedder: &'a dyn Embedder,
}

impl<'a> VectorRetriever<'a> {
    pub fn new(pool: &'a SqlitePool, embedder: &'a dyn Embedder) -> Self {
        Self { pool, embedder }
    }

    /// Warn if the index was built with a different embedding model than the
    /// one configured. A mismatch degrades retrieval quality with no error
    /// signal, so a stderr warning is the best available diagnostic.
    pub async fn warn_on_model_mismatch(&self) -> Result<()> {
        if let Some(indexed_model) =
            store::get_meta(self.pool, store::META_EMBEDDING_MODEL).await?
        {
            if indexed_model != self.embedder.model_name() {
                eprintln!(
                    "Warning: index was built with embedding model '{}' but '{}' is configured; \
                     retrieval quality will suffer. Re-run ingest.",
                    indexed_model,
                    self.embedder.model_name()
                );
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ContextRetriever for VectorRetriever<'_> {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let stored = store::load_all_vectors(self.pool).await?;
        if stored.is_empty() {
            return Ok(Vec::new());
        }

        let query_vec = embed_query(self.embedder, query).await?;

        let mut results: Vec<RetrievedChunk> = stored
            .into_iter()
            .map(|s| {
                let score = cosine_similarity(&query_vec, &s.embedding) as f64;
                RetrievedChunk {
                    source_file: s.source_file,
                    page: s.page,
                    text: s.text,
                    score,
                }
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);

        Ok(results)
    }
}

/// Concatenate retrieved chunk texts in rank order, separated by a blank
/// line. This is the "company context" handed to the report prompt.
pub fn format_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
