//! Language model abstraction and the Ollama implementation.
//!
//! The pipelines depend on a single capability: turn a prompt into a
//! free-text completion. Nothing here guarantees structure in the output
//! beyond what the prompt requests — the chart extractor parses defensively
//! for exactly that reason.

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::embedding::post_with_retry;

/// Produces a free-text completion for a prompt.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the model identifier (e.g. `"llama3.2:3b"`).
    fn model_name(&self) -> &str;

    /// Complete a prompt. The returned text is the model's output verbatim.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Create the configured [`LanguageModel`].
pub fn create_model(config: &LlmConfig) -> Result<Box<dyn LanguageModel>> {
    match config.provider.as_str() {
        "ollama" => Ok(Box::new(OllamaModel::new(config)?)),
        "disabled" => bail!("LLM provider is disabled. Set [llm] provider in config."),
        other => bail!("Unknown llm provider: {}", other),
    }
}

/// Completion via a local Ollama instance's `POST /api/generate` endpoint,
/// non-streaming. Retry policy matches the embedding providers: backoff on
/// 429/5xx/network errors, immediate failure otherwise.
pub struct OllamaModel {
    model: String,
    url: String,
    timeout_secs: u64,
    max_retries: u32,
}

impl OllamaModel {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("llm.model required for Ollama provider"))?;

        Ok(Self {
            model,
            url: config
                .url
                .clone()
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let json = post_with_retry(
            &format!("{}/api/generate", self.url),
            None,
            &body,
            self.timeout_secs,
            self.max_retries,
        )
        .await?;

        json.get("response")
            .and_then(|r| r.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Invalid Ollama response: missing response field"))
    }
}
