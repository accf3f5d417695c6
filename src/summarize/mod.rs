// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Map-reduce summarization
//!
//! Each content block becomes one prompt and one completion request (map);
//! the surviving block summaries are then combined by a single final request
//! (reduce).

pub mod config;
pub mod llm;
pub mod prompt;
pub mod summarizer;

pub use config::{LlmConfig, SummarizeConfig};
pub use llm::{
    Completion, CompletionError, CompletionProvider, CompletionRequest, OpenAiCompletionClient,
};
pub use prompt::{PromptBuilder, SummaryPrompt};
pub use summarizer::{
    limit_words, BlockFailure, BlockSummary, FinalSummary, MapOutcome, Summarizer,
};
