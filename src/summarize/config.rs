// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Summarization and language-model configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Approximate characters per token used to derive the block budget
pub const CHARS_PER_TOKEN: usize = 4;
/// Context window the default budget is sized for
pub const CONTEXT_WINDOW_TOKENS: usize = 4000;
/// Tokens reserved for the query and instruction text
pub const PROMPT_OVERHEAD_TOKENS: usize = 250;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizeConfig {
    /// Maximum characters of document text per block
    pub char_budget: usize,
    /// Concurrent block summarization requests
    pub workers: usize,
    /// Word target stated in each block prompt
    pub block_word_target: usize,
    /// Output cap for each block request
    pub block_max_tokens: u32,
    /// Output cap for the final request
    pub final_max_tokens: u32,
    /// Hard upper bound on words in the final summary
    pub final_word_limit: usize,
    /// Timeout for a single completion attempt
    pub request_timeout_secs: u64,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        let block_max_tokens = 250;
        Self {
            char_budget: CHARS_PER_TOKEN
                * (CONTEXT_WINDOW_TOKENS - PROMPT_OVERHEAD_TOKENS - block_max_tokens as usize),
            workers: 4,
            block_word_target: 200,
            block_max_tokens,
            final_max_tokens: 300,
            final_word_limit: 200,
            request_timeout_secs: 60,
        }
    }
}

impl SummarizeConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            char_budget: parse_env("SUMMARIZE_CHAR_BUDGET").unwrap_or(defaults.char_budget),
            workers: parse_env("SUMMARIZE_WORKERS").unwrap_or(defaults.workers),
            block_word_target: parse_env("SUMMARIZE_BLOCK_WORDS")
                .unwrap_or(defaults.block_word_target),
            block_max_tokens: parse_env("SUMMARIZE_BLOCK_MAX_TOKENS")
                .unwrap_or(defaults.block_max_tokens),
            final_max_tokens: parse_env("SUMMARIZE_FINAL_MAX_TOKENS")
                .unwrap_or(defaults.final_max_tokens),
            final_word_limit: parse_env("SUMMARIZE_FINAL_WORD_LIMIT")
                .unwrap_or(defaults.final_word_limit),
            request_timeout_secs: parse_env("SUMMARIZE_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.char_budget == 0 {
            return Err("char_budget must be at least 1".to_string());
        }
        if self.workers == 0 {
            return Err("Summarize workers must be at least 1".to_string());
        }
        if self.block_word_target == 0 || self.final_word_limit == 0 {
            return Err("Word limits must be greater than 0".to_string());
        }
        if self.block_max_tokens == 0 || self.final_max_tokens == 0 {
            return Err("Token limits must be greater than 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("Completion timeout must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// OpenAI-compatible chat completion endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL; `/v1/chat/completions` is appended
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.6,
            api_key: None,
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: env::var("LLM_ENDPOINT").unwrap_or(defaults.endpoint),
            model: env::var("LLM_MODEL").unwrap_or(defaults.model),
            temperature: parse_env("LLM_TEMPERATURE").unwrap_or(defaults.temperature),
            api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("LLM endpoint must not be empty".to_string());
        }
        if self.model.is_empty() {
            return Err("LLM model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Temperature {} outside 0.0..=2.0",
                self.temperature
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
