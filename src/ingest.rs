//! Ingestion pipeline orchestration.
//!
//! Coordinates the offline flow: discover PDFs → load page documents →
//! chunk → embed → rebuild the index. The rebuild is all-or-nothing: every
//! chunk is embedded before the database transaction opens, so any failure
//! along the way leaves the previous index untouched. The one intentional
//! partial-success allowance is per-file loading — a PDF that fails to parse
//! is skipped with a warning rather than aborting the run.

use anyhow::Result;
use std::path::PathBuf;

use crate::chunk::chunk_document;
use crate::config::Config;
use crate::docs;
use crate::embedding::Embedder;
use crate::models::{Chunk, IngestionSummary};
use crate::store;

/// Ingestion failure taxonomy. Anything else (I/O, HTTP, SQL) propagates as
/// a plain `anyhow` error.
#[derive(Debug)]
pub enum IngestError {
    /// The docs directory is missing or holds no files matching the include
    /// globs.
    NoDocumentsFound(PathBuf),
    /// Documents loaded but chunking produced nothing (e.g. every page was
    /// blank).
    NoChunksProduced,
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::NoDocumentsFound(dir) => {
                write!(f, "No documents found in '{}'", dir.display())
            }
            IngestError::NoChunksProduced => {
                write!(f, "No chunks produced from the loaded documents")
            }
        }
    }
}

impl std::error::Error for IngestError {}

/// Run the full ingestion pipeline and rebuild the index.
///
/// Re-runnable: the same document set produces an equivalent index on every
/// run (same chunk count, same chunk texts).
pub async fn run_ingest(config: &Config, embedder: &dyn Embedder) -> Result<IngestionSummary> {
    // 1. Enumerate source files
    let files = docs::scan_docs(&config.docs)?;
    if files.is_empty() {
        return Err(IngestError::NoDocumentsFound(config.docs.dir.clone()).into());
    }

    // 2. Load, skipping files that fail to parse
    let mut documents = Vec::new();
    for file in &files {
        match docs::load_documents(file) {
            Ok(mut pages) => documents.append(&mut pages),
            Err(e) => {
                eprintln!("Warning: skipping {}: {}", file.relative, e);
            }
        }
    }
    let document_count = documents.len();

    // 3. Chunk
    let chunks: Vec<Chunk> = documents
        .iter()
        .flat_map(|d| chunk_document(d, config.chunking.max_chars, config.chunking.overlap_chars))
        .collect();
    if chunks.is_empty() {
        return Err(IngestError::NoChunksProduced.into());
    }

    // 4. Embed every chunk, batched. A failed batch aborts the run before
    // anything is written.
    let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(config.embedding.batch_size) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let mut batch_vectors = embedder.embed_batch(&texts).await?;
        if batch_vectors.len() != texts.len() {
            anyhow::bail!(
                "Embedder returned {} vectors for {} texts",
                batch_vectors.len(),
                texts.len()
            );
        }
        vectors.append(&mut batch_vectors);
    }

    // 5. Replace the index contents in one transaction
    let pool = store::connect(&config.db.path).await?;
    store::rebuild_index(
        &pool,
        &chunks,
        &vectors,
        embedder.model_name(),
        embedder.dims(),
    )
    .await?;
    pool.close().await;

    Ok(IngestionSummary {
        document_count,
        chunk_count: chunks.len(),
    })
}
