// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Map and reduce phases

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::config::SummarizeConfig;
use super::llm::{Completion, CompletionError, CompletionProvider, CompletionRequest};
use super::prompt::{PromptBuilder, SummaryPrompt};
use crate::pipeline::{JobError, RetryPolicy, WorkerPool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
    pub block_sequence: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalSummary {
    pub text: String,
    pub word_count: usize,
}

#[derive(Debug, Clone)]
pub struct BlockFailure {
    pub block_sequence: usize,
    pub error: CompletionError,
}

/// Settled result of the map phase
#[derive(Debug, Clone)]
pub struct MapOutcome {
    /// Surviving summaries ordered by block sequence
    pub summaries: Vec<BlockSummary>,
    pub failures: Vec<BlockFailure>,
}

impl MapOutcome {
    pub fn attempted(&self) -> usize {
        self.summaries.len() + self.failures.len()
    }
}

/// Cut `text` to its first `limit` whitespace-separated words.
///
/// Text already within the limit is returned trimmed but otherwise unchanged.
pub fn limit_words(text: &str, limit: usize) -> FinalSummary {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return FinalSummary {
            text: text.trim().to_string(),
            word_count: words.len(),
        };
    }
    FinalSummary {
        text: words[..limit].join(" "),
        word_count: limit,
    }
}

/// Issues completion requests for both phases
pub struct Summarizer {
    provider: Arc<dyn CompletionProvider>,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Summarize every prompt on the worker pool and join on all of them.
    ///
    /// # Errors
    /// `JobError::SummarizationFailed` when no block produced a summary.
    pub async fn summarize_blocks(
        &self,
        prompts: Vec<SummaryPrompt>,
        config: &SummarizeConfig,
        retry: &RetryPolicy,
    ) -> Result<MapOutcome, JobError> {
        let pool = WorkerPool::new(config.workers);
        let sequences: Vec<usize> = prompts.iter().map(|p| p.block_sequence).collect();
        let timeout = config.request_timeout();
        let max_output_tokens = config.block_max_tokens;

        let provider = Arc::clone(&self.provider);
        let retry = retry.clone();
        let outputs = pool
            .run(prompts, move |prompt| {
                let provider = Arc::clone(&provider);
                let retry = retry.clone();
                async move {
                    let request = CompletionRequest {
                        prompt: prompt.instruction,
                        max_output_tokens,
                    };
                    complete_with_retry(provider.as_ref(), &request, timeout, &retry).await
                }
            })
            .await;

        let mut summaries = Vec::new();
        let mut failures = Vec::new();
        for (block_sequence, output) in sequences.into_iter().zip(outputs) {
            let error = match output {
                Some(Ok(completion)) => {
                    summaries.push(BlockSummary {
                        block_sequence,
                        text: completion.text,
                    });
                    continue;
                }
                Some(Err(e)) => e,
                None => CompletionError::Aborted,
            };
            warn!("Summary of block {} failed: {}", block_sequence, error);
            failures.push(BlockFailure {
                block_sequence,
                error,
            });
        }
        summaries.sort_by_key(|s| s.block_sequence);

        info!(
            "Summarized {} of {} blocks",
            summaries.len(),
            summaries.len() + failures.len()
        );

        if summaries.is_empty() {
            let reason = failures
                .first()
                .map(|f| f.error.to_string())
                .unwrap_or_else(|| "no blocks to summarize".to_string());
            return Err(JobError::SummarizationFailed(format!(
                "all {} block summaries failed, first error: {}",
                failures.len(),
                reason
            )));
        }

        Ok(MapOutcome {
            summaries,
            failures,
        })
    }

    /// Combine block summaries with one final request.
    ///
    /// Summaries are ordered by block sequence, joined by blank lines and cut
    /// to the character budget before the prompt is built. The result never
    /// exceeds `final_word_limit` words.
    pub async fn reduce(
        &self,
        summaries: &[BlockSummary],
        prompts: &PromptBuilder,
        config: &SummarizeConfig,
        retry: &RetryPolicy,
    ) -> Result<FinalSummary, JobError> {
        if summaries.is_empty() {
            return Err(JobError::SummarizationFailed(
                "no block summaries to reduce".to_string(),
            ));
        }

        let mut ordered: Vec<&BlockSummary> = summaries.iter().collect();
        ordered.sort_by_key(|s| s.block_sequence);
        let combined = ordered
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let combined = truncate_chars(&combined, config.char_budget);

        let request = CompletionRequest {
            prompt: prompts.build_reduce_prompt(combined, config.final_word_limit),
            max_output_tokens: config.final_max_tokens,
        };

        let completion = complete_with_retry(
            self.provider.as_ref(),
            &request,
            config.request_timeout(),
            retry,
        )
        .await
        .map_err(|e| JobError::SummarizationFailed(format!("final summary: {}", e)))?;

        let summary = limit_words(&completion.text, config.final_word_limit);
        info!("Final summary has {} words", summary.word_count);
        Ok(summary)
    }
}

async fn complete_with_retry(
    provider: &dyn CompletionProvider,
    request: &CompletionRequest,
    timeout: Duration,
    retry: &RetryPolicy,
) -> Result<Completion, CompletionError> {
    let completion = retry
        .run("completion", move || async move {
            tokio::time::timeout(timeout, provider.complete(request))
                .await
                .map_err(|_| CompletionError::Timeout(timeout.as_secs()))?
        })
        .await?;

    if completion.text.trim().is_empty() {
        return Err(CompletionError::EmptyResponse);
    }
    Ok(completion)
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
