//! Fixed-window overlapping text chunker.
//!
//! Splits document text into chunks of at most `max_chars` characters, where
//! consecutive chunks from the same document share exactly `overlap_chars`
//! characters. The window advances by `max_chars - overlap_chars` each step,
//! so the boundaries are fully determined by the input text and the two
//! configured lengths.
//!
//! Each chunk receives a random UUID plus a SHA-256 hash of its text; the
//! chunk *content* for a given input is deterministic, the ids are not.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::{Chunk, Document};

/// Split text into overlapping character windows.
///
/// Windows are cut on `char` boundaries, never mid-codepoint. Empty input
/// yields an empty sequence. Callers must guarantee `overlap < max_chars`
/// (enforced at config load); the window would otherwise never advance.
pub fn chunk_text(text: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    debug_assert!(overlap < max_chars);

    // Byte offset of each char, so windows can be sliced without re-scanning.
    let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let total = offsets.len();
    if total == 0 {
        return Vec::new();
    }

    let stride = max_chars - overlap;
    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let end = (start + max_chars).min(total);
        let byte_start = offsets[start];
        let byte_end = if end == total {
            text.len()
        } else {
            offsets[end]
        };
        chunks.push(text[byte_start..byte_end].to_string());

        if end == total {
            break;
        }
        start += stride;
    }

    chunks
}

/// Chunk one loaded document, inheriting its source metadata.
pub fn chunk_document(doc: &Document, max_chars: usize, overlap: usize) -> Vec<Chunk> {
    chunk_text(&doc.text, max_chars, overlap)
        .into_iter()
        .enumerate()
        .map(|(i, text)| make_chunk(doc, i as i64, text))
        .collect()
}

fn make_chunk(doc: &Document, index: i64, text: String) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Chunk {
        id: Uuid::new_v4().to_string(),
        source_file: doc.source_file.clone(),
        page: doc.page,
        chunk_index: index,
        text,
        hash,
    }
}
