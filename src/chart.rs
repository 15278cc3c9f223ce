//! Report-to-chart extraction.
//!
//! Asks the language model to boil a free-text compliance report down to
//! `(risk, score)` records and parses the untrusted output defensively. The
//! result is a tagged [`ChartExtraction`] so callers must handle each case —
//! "no chart available" is a value here, never a crash.

use anyhow::Result;

use crate::llm::LanguageModel;
use crate::models::RiskRecord;
use crate::prompts;

/// Outcome of parsing the model's chart output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartExtraction {
    /// Every object in the array was a valid record. `Parsed(vec![])` means
    /// the model found nothing to chart — valid, and distinct from a parse
    /// failure.
    Parsed(Vec<RiskRecord>),
    /// The array parsed but some objects were missing a risk name or an
    /// integer score and were dropped.
    PartiallyValid {
        records: Vec<RiskRecord>,
        dropped: usize,
    },
    /// The output was not a JSON array at all.
    Unparseable,
}

/// Ask the model to extract chart data from a report and parse the result.
///
/// A language-model failure is an error; a *parse* failure is the
/// [`ChartExtraction::Unparseable`] value.
pub async fn extract_chart_data(
    llm: &dyn LanguageModel,
    report_text: &str,
) -> Result<ChartExtraction> {
    let raw = llm
        .complete(&prompts::chart_extraction_prompt(report_text))
        .await?;
    Ok(parse_chart_output(&raw))
}

/// Parse raw model output strictly as a JSON array of
/// `{"risk": string, "score": integer}` objects.
///
/// Objects missing a non-empty `risk` string or an integer `score` are
/// dropped and counted; scores are clamped to `[0, 100]`.
pub fn parse_chart_output(raw: &str) -> ChartExtraction {
    let value: serde_json::Value = match serde_json::from_str(raw.trim()) {
        Ok(v) => v,
        Err(_) => return ChartExtraction::Unparseable,
    };

    let items = match value.as_array() {
        Some(items) => items,
        None => return ChartExtraction::Unparseable,
    };

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for item in items {
        match parse_record(item) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    if dropped == 0 {
        ChartExtraction::Parsed(records)
    } else {
        ChartExtraction::PartiallyValid { records, dropped }
    }
}

fn parse_record(item: &serde_json::Value) -> Option<RiskRecord> {
    let risk = item.get("risk")?.as_str()?.trim();
    if risk.is_empty() {
        return None;
    }
    // as_i64 rejects floats and strings: a score must be a JSON integer
    let score = item.get("score")?.as_i64()?;

    Some(RiskRecord {
        risk: risk.to_string(),
        score: score.clamp(0, 100),
    })
}
