//! # ESG Consultant CLI (`esgc`)
//!
//! The `esgc` binary drives the full flow: database initialization, PDF
//! ingestion, report generation, and chart-data extraction.
//!
//! ## Usage
//!
//! ```bash
//! esgc --config ./config/esgc.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `esgc init` | Create the SQLite database and run schema migrations |
//! | `esgc ingest` | Chunk, embed, and index the configured docs directory |
//! | `esgc ask "<question>"` | Generate a compliance report for a question |
//! | `esgc chart --report <path>` | Extract (risk, score) records from a saved report |
//! | `esgc stats` | Show index statistics |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use esg_consultant::chart::{self, ChartExtraction};
use esg_consultant::{config, embedding, ingest, llm, migrate, report, retrieve, store};

/// ESG Consultant — a retrieval-augmented compliance assistant over local
/// PDF document sets.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/esgc.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "esgc",
    about = "ESG Consultant — a retrieval-augmented compliance assistant over local PDF document sets",
    version,
    long_about = "ESG Consultant ingests a company's internal PDFs into a SQLite-backed vector \
    index and answers questions by combining retrieved document context with a language model, \
    producing a structured compliance report and chartable (risk, score) records."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/esgc.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables. Idempotent —
    /// running it multiple times is safe.
    Init,

    /// Ingest the configured docs directory into the index.
    ///
    /// Discovers PDFs, extracts page text, chunks, embeds, and replaces the
    /// whole index. Re-running rebuilds the index from scratch; the prior
    /// index stays intact if anything fails. Do not run `ask` concurrently
    /// with a rebuild.
    Ingest,

    /// Generate a compliance report for a question.
    ///
    /// Fetches industry risks from the language model and the top-k most
    /// relevant document chunks from the index, then synthesizes both into a
    /// structured compliance report printed to stdout.
    Ask {
        /// The user's question (e.g. "Generate our compliance report").
        question: String,

        /// Industry label used for the common-risks stage.
        #[arg(long, default_value = "Technology")]
        industry: String,

        /// Number of chunks to retrieve; defaults to retrieval.top_k.
        #[arg(long)]
        top_k: Option<usize>,

        /// Also write the report to this file, for later `chart` runs.
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Extract chartable (risk, score) records from a saved report.
    ///
    /// Reads the report text, asks the language model to distill it into
    /// JSON records, and validates the result. Invalid records are dropped
    /// and counted; unparseable output is reported, not fatal to the report
    /// itself.
    Chart {
        /// Path to a report previously saved with `ask --save`.
        #[arg(long)]
        report: PathBuf,

        /// Print the records as a JSON array instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show index statistics.
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = store::connect(&cfg.db.path).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Ingest => {
            let embedder = embedding::create_embedder(&cfg.embedding)?;
            let summary = ingest::run_ingest(&cfg, embedder.as_ref()).await?;
            println!("ingest");
            println!("  documents loaded: {}", summary.document_count);
            println!("  chunks indexed: {}", summary.chunk_count);
            println!("  embedding model: {}", embedder.model_name());
            println!("ok");
        }
        Commands::Ask {
            question,
            industry,
            top_k,
            save,
        } => {
            let embedder = embedding::create_embedder(&cfg.embedding)?;
            let model = llm::create_model(&cfg.llm)?;
            let pool = store::connect(&cfg.db.path).await?;

            let retriever = retrieve::VectorRetriever::new(&pool, embedder.as_ref());
            retriever.warn_on_model_mismatch().await?;

            let k = top_k.unwrap_or(cfg.retrieval.top_k);
            let report_text =
                report::generate_report(model.as_ref(), &retriever, &industry, &question, k)
                    .await?;
            pool.close().await;

            println!("{}", report_text);

            if let Some(path) = save {
                std::fs::write(&path, &report_text)?;
                eprintln!("Report saved to {}", path.display());
            }
        }
        Commands::Chart { report, json } => {
            let report_text = std::fs::read_to_string(&report)?;
            let model = llm::create_model(&cfg.llm)?;

            match chart::extract_chart_data(model.as_ref(), &report_text).await? {
                ChartExtraction::Unparseable => {
                    eprintln!(
                        "Failed to decode chart data from the model: the output was not valid JSON. \
                         The report is unaffected; try again."
                    );
                    std::process::exit(1);
                }
                ChartExtraction::Parsed(records) => print_records(&records, 0, json)?,
                ChartExtraction::PartiallyValid { records, dropped } => {
                    print_records(&records, dropped, json)?
                }
            }
        }
        Commands::Stats => {
            let pool = store::connect(&cfg.db.path).await?;
            let stats = store::index_stats(&pool).await?;
            pool.close().await;

            println!("index stats");
            println!("  files: {}", stats.file_count);
            println!("  chunks: {}", stats.chunk_count);
            println!(
                "  embedding model: {}",
                stats.embedding_model.as_deref().unwrap_or("(never built)")
            );
            if let Some(built_at) = stats.built_at {
                println!("  built at: {}", built_at);
            }
        }
    }

    Ok(())
}

fn print_records(
    records: &[esg_consultant::models::RiskRecord],
    dropped: usize,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else if records.is_empty() {
        println!("No chartable data found in the report.");
    } else {
        println!("{:<40} {:>5}", "risk", "score");
        for record in records {
            println!("{:<40} {:>5}", record.risk, record.score);
        }
    }

    if dropped > 0 {
        eprintln!("Warning: dropped {} invalid record(s) from model output", dropped);
    }
    Ok(())
}
