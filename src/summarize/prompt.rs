// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Summarization prompts

use serde::Serialize;

use crate::collate::ContentBlock;
use crate::pipeline::JobError;

/// Instruction for summarizing one block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPrompt {
    pub block_sequence: usize,
    pub instruction: String,
}

const STYLE_GUIDANCE: &str = "Write in a neutral, informative tone as plain prose. \
Do not use headings or bullet points, and do not mention that the text came from web results.";

/// Builds the map and reduce prompts for one query
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    query: String,
    word_target: usize,
}

impl PromptBuilder {
    pub fn new(query: impl Into<String>, word_target: usize) -> Self {
        Self {
            query: query.into(),
            word_target,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Wrap a block's text in the summarization instruction.
    ///
    /// # Errors
    /// `JobError::InvalidBlock` when the block has no text.
    pub fn build_prompt(&self, block: &ContentBlock) -> Result<SummaryPrompt, JobError> {
        if block.text.trim().is_empty() {
            return Err(JobError::InvalidBlock {
                sequence: block.sequence,
                reason: "block text is empty".to_string(),
            });
        }

        let instruction = format!(
            "Below, fenced in triple backticks, is the content extracted from the web for the query '{}'.\n\n```\n{}\n```\n\nSummarize the web results in {} words. {}",
            self.query,
            block.text.trim_end(),
            self.word_target,
            STYLE_GUIDANCE
        );

        Ok(SummaryPrompt {
            block_sequence: block.sequence,
            instruction,
        })
    }

    /// Instruction combining the ordered block summaries into one answer
    pub fn build_reduce_prompt(&self, combined_summaries: &str, word_limit: usize) -> String {
        format!(
            "Below, fenced in triple backticks, are summaries of content extracted from the web for the query '{}'.\n\n```\n{}\n```\n\nCombine them into a single summary of at most {} words. {}",
            self.query, combined_summaries, word_limit, STYLE_GUIDANCE
        )
    }
}
