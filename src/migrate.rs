use anyhow::Result;
use sqlx::SqlitePool;

/// Create the index schema. Idempotent — safe to run any number of times.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // Persisted chunks, one row per window of a source page
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            source_file TEXT NOT NULL,
            page INTEGER NOT NULL,
            chunk_index INTEGER NOT NULL,
            text TEXT NOT NULL,
            hash TEXT NOT NULL,
            UNIQUE(source_file, page, chunk_index)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One embedding vector per chunk, little-endian f32 bytes
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chunk_vectors (
            chunk_id TEXT PRIMARY KEY,
            embedding BLOB NOT NULL,
            FOREIGN KEY (chunk_id) REFERENCES chunks(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Key-value metadata about the last rebuild (embedding model, dims, ...)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS index_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_source_file ON chunks(source_file)")
        .execute(pool)
        .await?;

    Ok(())
}
