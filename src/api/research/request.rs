// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Research API request types

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::errors::ApiError;
use crate::config::PipelineConfig;

pub const MAX_QUERY_CHARS: usize = 500;
pub const MAX_TOP_K: usize = 20;

/// Request body for POST /v1/research and /v1/research/stream
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    /// Free-text query (required, max 500 chars)
    pub query: String,

    /// Number of search results to read (1-20, server default when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,

    /// Optional request ID for tracking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ResearchRequest {
    /// Validate the request
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.query.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "query".to_string(),
                message: "Query cannot be empty".to_string(),
            });
        }
        if self.query.chars().count() > MAX_QUERY_CHARS {
            return Err(ApiError::ValidationError {
                field: "query".to_string(),
                message: format!("Query too long (max {} characters)", MAX_QUERY_CHARS),
            });
        }
        if let Some(top_k) = self.top_k {
            if top_k < 1 {
                return Err(ApiError::ValidationError {
                    field: "topK".to_string(),
                    message: "topK must be at least 1".to_string(),
                });
            }
            if top_k > MAX_TOP_K {
                return Err(ApiError::ValidationError {
                    field: "topK".to_string(),
                    message: format!("topK cannot exceed {}", MAX_TOP_K),
                });
            }
        }
        Ok(())
    }

    /// Job configuration: the server defaults with this request's overrides
    pub fn job_config(&self, base: &Arc<PipelineConfig>) -> Arc<PipelineConfig> {
        match self.top_k {
            Some(top_k) if top_k != base.search.top_k => {
                let mut config = PipelineConfig::clone(base);
                config.search.top_k = top_k;
                Arc::new(config)
            }
            _ => Arc::clone(base),
        }
    }
}
