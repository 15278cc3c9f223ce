//! # ESG Consultant
//!
//! A retrieval-augmented ESG compliance assistant over local PDF document sets.
//!
//! The crate ingests a company's internal PDFs into a SQLite-backed vector
//! index, then answers questions by combining retrieved document context with
//! a language model's general knowledge, producing a structured compliance
//! report and, on demand, chartable (risk, score) records extracted from it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌───────────┐
//! │ PDF docs │──▶│   Ingest      │──▶│  SQLite    │
//! │ (docs/)  │   │ Chunk+Embed  │   │ chunks+vec │
//! └──────────┘   └──────────────┘   └─────┬─────┘
//!                                         │ retrieve
//!                 ┌───────────────────────┤
//!                 ▼                       ▼
//!            ┌─────────┐   ┌─────────────────────────┐
//!            │ Ollama  │◀──│  Query pipeline (ask)    │──▶ report
//!            │  LLM    │   │  risks ∥ retrieval → C   │
//!            └─────────┘   └─────────────────────────┘
//!                                         │
//!                                         ▼
//!                          chart: report → [(risk, score)]
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! esgc init                                  # create database
//! esgc ingest                                # index the docs directory
//! esgc ask "Generate our compliance report" --industry Technology --save report.md
//! esgc chart --report report.md --json
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`docs`] | Source document discovery and loading |
//! | [`extract`] | PDF text extraction |
//! | [`chunk`] | Overlapping text chunking |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`llm`] | Language model abstraction |
//! | [`store`] | Index persistence |
//! | [`ingest`] | Ingestion pipeline |
//! | [`retrieve`] | Similarity retrieval |
//! | [`prompts`] | Prompt composition |
//! | [`report`] | Query pipeline |
//! | [`chart`] | Report-to-chart extraction |

pub mod chart;
pub mod chunk;
pub mod config;
pub mod docs;
pub mod embedding;
pub mod extract;
pub mod ingest;
pub mod llm;
pub mod migrate;
pub mod models;
pub mod prompts;
pub mod report;
pub mod retrieve;
pub mod store;
