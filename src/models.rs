//! Core data models used throughout the ESG consultant.
//!
//! These types represent the documents, chunks, and retrieval results that
//! flow through the ingestion and query pipelines, plus the chart records
//! extracted from a generated report.

use serde::Serialize;

/// A page of raw text loaded from a source file, before chunking.
///
/// Documents exist only during ingestion: they are produced by the loader,
/// consumed by the chunker, and never persisted.
#[derive(Debug, Clone)]
pub struct Document {
    /// File name relative to the docs directory.
    pub source_file: String,
    /// 1-based page number within the source file.
    pub page: i64,
    pub text: String,
}

/// A bounded-length segment of a document's text, persisted in the index.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub source_file: String,
    pub page: i64,
    /// Contiguous index within the source page, starting at 0.
    pub chunk_index: i64,
    pub text: String,
    /// SHA-256 of the chunk text, hex-encoded.
    pub hash: String,
}

/// A chunk returned by the retriever, with its similarity score.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub source_file: String,
    pub page: i64,
    pub text: String,
    /// Cosine similarity against the query embedding, higher is better.
    pub score: f64,
}

/// Counts reported after a successful ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionSummary {
    /// Page-level documents loaded (a 10-page PDF counts as 10).
    pub document_count: usize,
    pub chunk_count: usize,
}

/// A (risk name, compliance score) pair extracted from a report.
///
/// `score` is always within `[0, 100]`; out-of-range values from the model
/// are clamped at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskRecord {
    pub risk: String,
    pub score: i64,
}
