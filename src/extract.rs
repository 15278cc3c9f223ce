//! PDF text extraction.
//!
//! Source files are binary PDFs; this module turns their bytes into one
//! plain-UTF-8 string per page so downstream chunks can carry a page number.
//! Extraction failures are returned, never panicked — the ingestion pipeline
//! skips the offending file and carries on.

/// Extraction error. Wraps the underlying library message as a string so the
/// error stays `Send + Sync` regardless of the backend's error types.
#[derive(Debug)]
pub enum ExtractError {
    Pdf(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Extract plain text from a PDF, one string per page, in page order.
///
/// Pages that contain no extractable text come back as empty strings; the
/// caller decides whether an all-empty result is worth keeping.
pub fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}
