//! The query pipeline: retrieval plus multi-stage language-model calls.
//!
//! Three stages produce a compliance report:
//! - **Stage A** — ask the model for the industry's common ESG risks.
//! - **Stage B** — retrieve the top-k document chunks for the user question.
//! - **Stage C** — synthesize risks, retrieved context, and question into the
//!   final report.
//!
//! A and B have no data dependency and run concurrently; C waits on both.
//! There is no automatic retry: this serves an interactive caller who can
//! simply re-ask, and a failed stage surfaces as [`GenerationFailed`] naming
//! where it happened.

use crate::llm::LanguageModel;
use crate::prompts;
use crate::retrieve::{format_context, ContextRetriever};

/// The pipeline stage at which a failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    IndustryRisks,
    Retrieval,
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::IndustryRisks => "industry-risks",
            Stage::Retrieval => "retrieval",
            Stage::Report => "report",
        };
        f.write_str(name)
    }
}

/// A query-pipeline failure, carrying the stage and the underlying cause.
#[derive(Debug)]
pub struct GenerationFailed {
    pub stage: Stage,
    pub cause: anyhow::Error,
}

impl std::fmt::Display for GenerationFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Report generation failed at the {} stage: {}",
            self.stage, self.cause
        )
    }
}

impl std::error::Error for GenerationFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

/// Generate a compliance report for an industry and user question.
///
/// Returns the model's Stage C output verbatim — orchestration never edits
/// report text.
pub async fn generate_report(
    llm: &dyn LanguageModel,
    retriever: &dyn ContextRetriever,
    industry: &str,
    user_question: &str,
    top_k: usize,
) -> Result<String, GenerationFailed> {
    // Stages A and B are independent; dispatch them concurrently. The
    // prompt must outlive the join, so bind it before building the futures.
    let risk_prompt = prompts::industry_risk_prompt(industry);
    let (risks_result, chunks_result) = tokio::join!(
        llm.complete(&risk_prompt),
        retriever.retrieve(user_question, top_k),
    );

    let industry_risks = risks_result.map_err(|cause| GenerationFailed {
        stage: Stage::IndustryRisks,
        cause,
    })?;
    let chunks = chunks_result.map_err(|cause| GenerationFailed {
        stage: Stage::Retrieval,
        cause,
    })?;

    let company_context = format_context(&chunks);

    // Stage C: synthesis
    llm.complete(&prompts::report_prompt(
        &industry_risks,
        &company_context,
        user_question,
    ))
    .await
    .map_err(|cause| GenerationFailed {
        stage: Stage::Report,
        cause,
    })
}
