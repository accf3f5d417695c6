// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Completion capability and its OpenAI-compatible client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::config::LlmConfig;
use crate::pipeline::retry::Retryable;

/// One prompt with its output cap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
}

#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    #[error("Completion timed out after {0}s")]
    Timeout(u64),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Completion returned no text")]
    EmptyResponse,
    #[error("Failed to parse completion response: {0}")]
    Parse(String),
    #[error("Client error: {0}")]
    Client(String),
    #[error("Completion task did not complete")]
    Aborted,
}

impl Retryable for CompletionError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Http(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Language-model completion capability
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError>;

    fn model_name(&self) -> &str;
}

// --- OpenAI-compatible serde structs ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Client for `/v1/chat/completions`
///
/// Per-request timeouts are applied by the caller so the same bound covers
/// connection and body reads.
pub struct OpenAiCompletionClient {
    client: Client,
    endpoint: String,
    model_name: String,
    temperature: f32,
    api_key: Option<String>,
}

impl OpenAiCompletionClient {
    pub fn new(config: &LlmConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .build()
            .map_err(|e| CompletionError::Client(e.to_string()))?;

        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        info!(
            "Completion client configured: endpoint={}, model={}",
            endpoint, config.model
        );

        Ok(Self {
            client,
            endpoint,
            model_name: config.model.clone(),
            temperature: config.temperature,
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        let body = ChatRequest {
            model: &self.model_name,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_output_tokens,
            temperature: self.temperature,
        };

        let mut http_request = self
            .client
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .json(&body);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key.trim());
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| CompletionError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Parse(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            debug!("Completion used {} tokens", usage.total_tokens);
        }

        let text = parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        Ok(Completion { text })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
