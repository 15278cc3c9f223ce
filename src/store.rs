//! Index persistence: the rebuild write path and the read queries.
//!
//! The index has full-rebuild semantics. [`rebuild_index`] deletes all prior
//! rows and inserts the new chunk set inside one transaction, so an
//! interrupted run leaves the previous index intact rather than a partial
//! mix of old and new chunks.

use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;

use crate::embedding::{blob_to_vec, vec_to_blob};
use crate::models::Chunk;

pub const META_EMBEDDING_MODEL: &str = "embedding_model";
pub const META_EMBEDDING_DIMS: &str = "embedding_dims";
pub const META_BUILT_AT: &str = "built_at";

/// Open the SQLite index database, creating the file and its parent
/// directory if missing. WAL keeps `stats`/`ask` reads usable while a
/// rebuild transaction is open; foreign keys are on because `chunk_vectors`
/// references `chunks`.
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Replace the entire index contents with the given chunks and vectors.
///
/// `vectors` must be parallel to `chunks`. Records the embedding model and
/// dimensionality in `index_meta` so later queries can detect a model switch.
pub async fn rebuild_index(
    pool: &SqlitePool,
    chunks: &[Chunk],
    vectors: &[Vec<f32>],
    model_name: &str,
    dims: usize,
) -> Result<()> {
    debug_assert_eq!(chunks.len(), vectors.len());

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM chunk_vectors")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM chunks").execute(&mut *tx).await?;

    for (chunk, vector) in chunks.iter().zip(vectors.iter()) {
        sqlx::query(
            "INSERT INTO chunks (id, source_file, page, chunk_index, text, hash) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&chunk.id)
        .bind(&chunk.source_file)
        .bind(chunk.page)
        .bind(chunk.chunk_index)
        .bind(&chunk.text)
        .bind(&chunk.hash)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO chunk_vectors (chunk_id, embedding) VALUES (?, ?)")
            .bind(&chunk.id)
            .bind(vec_to_blob(vector))
            .execute(&mut *tx)
            .await?;
    }

    let now = Utc::now().to_rfc3339();
    for (key, value) in [
        (META_EMBEDDING_MODEL, model_name.to_string()),
        (META_EMBEDDING_DIMS, dims.to_string()),
        (META_BUILT_AT, now),
    ] {
        sqlx::query(
            r#"
            INSERT INTO index_meta (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// A stored chunk together with its decoded embedding.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    pub source_file: String,
    pub page: i64,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Load every stored chunk with its vector. An empty index yields an empty
/// list, not an error.
pub async fn load_all_vectors(pool: &SqlitePool) -> Result<Vec<StoredChunk>> {
    let rows = sqlx::query(
        r#"
        SELECT c.source_file, c.page, c.text, cv.embedding
        FROM chunk_vectors cv
        JOIN chunks c ON c.id = cv.chunk_id
        ORDER BY c.source_file, c.page, c.chunk_index
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| {
            let blob: Vec<u8> = row.get("embedding");
            StoredChunk {
                source_file: row.get("source_file"),
                page: row.get("page"),
                text: row.get("text"),
                embedding: blob_to_vec(&blob),
            }
        })
        .collect())
}

/// Read one `index_meta` value, `None` if the index was never built.
pub async fn get_meta(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM index_meta WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(value)
}

/// Index statistics for the `stats` command.
#[derive(Debug)]
pub struct IndexStats {
    pub chunk_count: i64,
    pub file_count: i64,
    pub embedding_model: Option<String>,
    pub built_at: Option<String>,
}

pub async fn index_stats(pool: &SqlitePool) -> Result<IndexStats> {
    let chunk_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
        .fetch_one(pool)
        .await?;
    let file_count: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT source_file) FROM chunks")
        .fetch_one(pool)
        .await?;

    Ok(IndexStats {
        chunk_count,
        file_count,
        embedding_model: get_meta(pool, META_EMBEDDING_MODEL).await?,
        built_at: get_meta(pool, META_BUILT_AT).await?,
    })
}
