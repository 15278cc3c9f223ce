//! End-to-end pipeline tests with fake external capabilities.
//!
//! The embedder and language model are substituted with deterministic fakes;
//! the index is a real SQLite database in a temp directory, so these tests
//! exercise the actual ingest → store → retrieve path.

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tempfile::TempDir;

use esg_consultant::config::{
    ChunkingConfig, Config, DbConfig, DocsConfig, EmbeddingConfig, LlmConfig, RetrievalConfig,
};
use esg_consultant::embedding::Embedder;
use esg_consultant::ingest::{run_ingest, IngestError};
use esg_consultant::llm::LanguageModel;
use esg_consultant::models::RetrievedChunk;
use esg_consultant::report::generate_report;
use esg_consultant::retrieve::{ContextRetriever, VectorRetriever};
use esg_consultant::{migrate, store};

/// Deterministic embedder: a normalized byte histogram. Identical texts get
/// identical vectors, so similarity ranking is stable across runs.
struct FakeEmbedder;

#[async_trait]
impl Embedder for FakeEmbedder {
    fn model_name(&self) -> &str {
        "fake-embed"
    }

    fn dims(&self) -> usize {
        8
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = vec![0.0f32; 8];
                for (i, b) in t.bytes().enumerate() {
                    v[i % 8] += b as f32;
                }
                let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
                v.into_iter().map(|x| x / norm).collect()
            })
            .collect())
    }
}

/// Minimal valid single-page PDF containing the given phrase. Builds the
/// body then the xref with correct byte offsets so pdf-extract can parse it.
fn minimal_pdf_with_phrase(phrase: &str) -> Vec<u8> {
    let stream = format!("BT /F1 12 Tf 100 700 Td ({}) Tj ET\n", phrase);
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let o1 = out.len();
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    let o2 = out.len();
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    let o3 = out.len();
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    let o4 = out.len();
    out.extend_from_slice(
        format!(
            "4 0 obj << /Length {} >> stream\n{}endstream endobj\n",
            stream.len(),
            stream
        )
        .as_bytes(),
    );
    let o5 = out.len();
    out.extend_from_slice(
        b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
    );
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in [o1, o2, o3, o4, o5] {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

fn test_config(root: &Path) -> Config {
    Config {
        db: DbConfig {
            path: root.join("data/esg.sqlite"),
        },
        docs: DocsConfig {
            dir: root.join("docs"),
            include_globs: vec!["**/*.pdf".to_string()],
        },
        chunking: ChunkingConfig {
            max_chars: 1000,
            overlap_chars: 200,
        },
        retrieval: RetrievalConfig { top_k: 5 },
        embedding: EmbeddingConfig::default(),
        llm: LlmConfig::default(),
    }
}

async fn init_db(config: &Config) {
    let pool = store::connect(&config.db.path).await.unwrap();
    migrate::run_migrations(&pool).await.unwrap();
    pool.close().await;
}

fn write_docs(root: &Path, phrases: &[(&str, &str)]) {
    let docs_dir = root.join("docs");
    std::fs::create_dir_all(&docs_dir).unwrap();
    for (name, phrase) in phrases {
        std::fs::write(docs_dir.join(name), minimal_pdf_with_phrase(phrase)).unwrap();
    }
}

#[tokio::test]
async fn ingest_empty_directory_yields_no_documents_found() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    init_db(&config).await;
    std::fs::create_dir_all(&config.docs.dir).unwrap();

    let err = run_ingest(&config, &FakeEmbedder).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<IngestError>(),
        Some(IngestError::NoDocumentsFound(_))
    ));
}

#[tokio::test]
async fn ingest_missing_directory_yields_no_documents_found() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    init_db(&config).await;

    let err = run_ingest(&config, &FakeEmbedder).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<IngestError>(),
        Some(IngestError::NoDocumentsFound(_))
    ));
}

#[tokio::test]
async fn ingest_indexes_all_documents() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    init_db(&config).await;
    write_docs(
        tmp.path(),
        &[
            ("alpha.pdf", "Our data privacy policy covers GDPR."),
            ("beta.pdf", "We recycle all electronic waste."),
            ("gamma.pdf", "Supplier audits run every quarter."),
        ],
    );

    let summary = run_ingest(&config, &FakeEmbedder).await.unwrap();
    assert_eq!(summary.document_count, 3);
    assert_eq!(summary.chunk_count, 3);

    let pool = store::connect(&config.db.path).await.unwrap();
    let stored = store::load_all_vectors(&pool).await.unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|s| s.embedding.len() == 8));
    assert!(stored.iter().all(|s| s.page == 1));
    assert_eq!(
        store::get_meta(&pool, store::META_EMBEDDING_MODEL)
            .await
            .unwrap()
            .as_deref(),
        Some("fake-embed")
    );
    pool.close().await;
}

#[tokio::test]
async fn reingest_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    init_db(&config).await;
    write_docs(
        tmp.path(),
        &[
            ("alpha.pdf", "Our data privacy policy covers GDPR."),
            ("beta.pdf", "We recycle all electronic waste."),
        ],
    );

    let first = run_ingest(&config, &FakeEmbedder).await.unwrap();
    let second = run_ingest(&config, &FakeEmbedder).await.unwrap();
    assert_eq!(first, second);

    let pool = store::connect(&config.db.path).await.unwrap();
    let stored = store::load_all_vectors(&pool).await.unwrap();
    assert_eq!(stored.len(), first.chunk_count);
    let mut texts: Vec<String> = stored.iter().map(|s| s.text.clone()).collect();
    texts.sort();
    assert!(texts[0].contains("data privacy"));
    assert!(texts[1].contains("electronic waste"));
    pool.close().await;
}

#[tokio::test]
async fn failed_ingest_leaves_prior_index_untouched() {
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(tmp.path());
    init_db(&config).await;
    write_docs(tmp.path(), &[("alpha.pdf", "Original indexed content.")]);
    run_ingest(&config, &FakeEmbedder).await.unwrap();

    // Point at a directory with nothing to ingest; the run fails
    config.docs.dir = tmp.path().join("empty");
    std::fs::create_dir_all(&config.docs.dir).unwrap();
    assert!(run_ingest(&config, &FakeEmbedder).await.is_err());

    let pool = store::connect(&config.db.path).await.unwrap();
    let stored = store::load_all_vectors(&pool).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].text.contains("Original indexed content"));
    pool.close().await;
}

#[tokio::test]
async fn unreadable_file_is_skipped_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    init_db(&config).await;
    write_docs(tmp.path(), &[("good.pdf", "A real policy document.")]);
    std::fs::write(config.docs.dir.join("broken.pdf"), b"not a pdf at all").unwrap();

    let summary = run_ingest(&config, &FakeEmbedder).await.unwrap();
    assert_eq!(summary.document_count, 1);
    assert_eq!(summary.chunk_count, 1);
}

#[tokio::test]
async fn retrieval_returns_at_most_index_size() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    init_db(&config).await;
    write_docs(
        tmp.path(),
        &[
            ("a.pdf", "Water usage reporting."),
            ("b.pdf", "Carbon emission targets."),
            ("c.pdf", "Board diversity statistics."),
        ],
    );
    run_ingest(&config, &FakeEmbedder).await.unwrap();

    let pool = store::connect(&config.db.path).await.unwrap();
    let embedder = FakeEmbedder;
    let retriever = VectorRetriever::new(&pool, &embedder);

    // k=5 against an index of 3 chunks: exactly 3 results, not an error
    let results = retriever.retrieve("emissions", 5).await.unwrap();
    assert_eq!(results.len(), 3);

    // Ordered by decreasing similarity
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    let top_two = retriever.retrieve("emissions", 2).await.unwrap();
    assert_eq!(top_two.len(), 2);
    pool.close().await;
}

#[tokio::test]
async fn retrieval_against_empty_index_is_empty() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    init_db(&config).await;

    let pool = store::connect(&config.db.path).await.unwrap();
    let embedder = FakeEmbedder;
    let retriever = VectorRetriever::new(&pool, &embedder);
    let results = retriever.retrieve("anything", 5).await.unwrap();
    assert!(results.is_empty());
    pool.close().await;
}

// ============ Query pipeline orchestration ============

const FIXTURE_REPORT: &str = "## Compliance Report\n\n1. Data Privacy: strong policy found.\n2. E-Waste: No specific information was found in the documents regarding E-Waste.\n\n## Recommendations\nDevelop an e-waste policy.";

/// Answers the industry-risk prompt with a canned list and every other
/// prompt with the fixture report.
struct ScriptedModel;

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        if prompt.contains("expert ESG analyst") {
            Ok("1. Data Privacy\n2. E-Waste".to_string())
        } else {
            Ok(FIXTURE_REPORT.to_string())
        }
    }
}

struct FixedRetriever;

#[async_trait]
impl ContextRetriever for FixedRetriever {
    async fn retrieve(&self, _query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let chunks = vec![
            RetrievedChunk {
                source_file: "privacy.pdf".to_string(),
                page: 2,
                text: "All customer data is encrypted at rest.".to_string(),
                score: 0.91,
            },
            RetrievedChunk {
                source_file: "handbook.pdf".to_string(),
                page: 7,
                text: "Employees complete annual privacy training.".to_string(),
                score: 0.84,
            },
        ];
        Ok(chunks.into_iter().take(k).collect())
    }
}

#[tokio::test]
async fn pipeline_returns_model_output_verbatim() {
    let report = generate_report(
        &ScriptedModel,
        &FixedRetriever,
        "Technology",
        "Generate our compliance report",
        5,
    )
    .await
    .unwrap();
    assert_eq!(report, FIXTURE_REPORT);
}

#[tokio::test]
async fn pipeline_with_empty_retrieval_still_generates() {
    struct EmptyRetriever;

    #[async_trait]
    impl ContextRetriever for EmptyRetriever {
        async fn retrieve(&self, _query: &str, _k: usize) -> Result<Vec<RetrievedChunk>> {
            Ok(Vec::new())
        }
    }

    let report = generate_report(
        &ScriptedModel,
        &EmptyRetriever,
        "Technology",
        "Generate our compliance report",
        5,
    )
    .await
    .unwrap();
    assert_eq!(report, FIXTURE_REPORT);
}
