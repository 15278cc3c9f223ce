//! Source document discovery and loading.
//!
//! Walks the configured docs directory, matches files against the include
//! globs (default `**/*.pdf`), and loads each match into page-level
//! [`Document`]s. A file that fails to parse is skipped with a warning;
//! loading never aborts the whole scan over one bad file.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::config::DocsConfig;
use crate::extract;
use crate::models::Document;

/// A candidate file found under the docs directory.
#[derive(Debug, Clone)]
pub struct DocFile {
    pub path: PathBuf,
    /// Path relative to the docs dir, used as the document's source label.
    pub relative: String,
}

/// Enumerate ingestable files under `docs.dir`, sorted for determinism.
///
/// A missing directory yields an empty list; the ingestion pipeline owns the
/// decision that "nothing to ingest" is an error.
pub fn scan_docs(docs: &DocsConfig) -> Result<Vec<DocFile>> {
    if !docs.dir.exists() {
        return Ok(Vec::new());
    }

    let include_set = build_globset(&docs.include_globs)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(&docs.dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path
            .strip_prefix(&docs.dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        if !include_set.is_match(&relative) {
            continue;
        }

        files.push(DocFile {
            path: path.to_path_buf(),
            relative,
        });
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}

/// Load one file into page-level documents. Pages with no extractable text
/// are dropped; a PDF of scanned images can legitimately produce nothing.
pub fn load_documents(file: &DocFile) -> Result<Vec<Document>> {
    let bytes = std::fs::read(&file.path)?;
    let pages = extract::extract_pdf_pages(&bytes)?;

    let docs = pages
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| Document {
            source_file: file.relative.clone(),
            page: i as i64 + 1,
            text,
        })
        .collect();

    Ok(docs)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
