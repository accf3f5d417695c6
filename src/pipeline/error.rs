// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Job-level errors and warnings

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::search::SearchError;

/// Fatal job outcomes
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The job's configuration snapshot failed validation
    #[error("Invalid job configuration: {0}")]
    InvalidConfig(String),

    /// No candidate documents could be obtained
    #[error("Search unavailable: {0}")]
    SearchUnavailable(String),

    /// Every fetch/extraction failed
    #[error("No content extracted from {attempted} candidate documents")]
    NoContentExtracted { attempted: usize },

    #[error("Invalid block {sequence}: {reason}")]
    InvalidBlock { sequence: usize, reason: String },

    /// Every block summarization failed, or the final reduction failed
    #[error("Summarization failed: {0}")]
    SummarizationFailed(String),

    #[error("Job cancelled")]
    Cancelled,
}

impl JobError {
    /// Stable machine-readable name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidQuery(_) => "invalid_query",
            Self::InvalidConfig(_) => "invalid_config",
            Self::SearchUnavailable(_) => "search_unavailable",
            Self::NoContentExtracted { .. } => "no_content_extracted",
            Self::InvalidBlock { .. } => "invalid_block",
            Self::SummarizationFailed(_) => "summarization_failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl From<SearchError> for JobError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::InvalidQuery { reason } => Self::InvalidQuery(reason),
            other => Self::SearchUnavailable(other.to_string()),
        }
    }
}

/// Non-fatal outcomes recorded on a successful job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobWarning {
    PartialExtractionFailure { failed: usize, total: usize },
    PartialSummarizationFailure { failed: usize, total: usize },
}
