// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::pipeline::JobError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    InvalidRequest(String),
    ValidationError { field: String, message: String },
    Job(JobError),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self, request_id: Option<String>) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("validation_error", message.clone(), Some(details))
            }
            ApiError::Job(error) => {
                let details = match error {
                    JobError::NoContentExtracted { attempted } => {
                        let mut details = HashMap::new();
                        details.insert(
                            "attempted".to_string(),
                            serde_json::Value::Number((*attempted).into()),
                        );
                        Some(details)
                    }
                    JobError::InvalidBlock { sequence, .. } => {
                        let mut details = HashMap::new();
                        details.insert(
                            "sequence".to_string(),
                            serde_json::Value::Number((*sequence).into()),
                        );
                        Some(details)
                    }
                    _ => None,
                };
                (error.kind(), error.to_string(), details)
            }
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            request_id,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::Job(error) => match error {
                JobError::InvalidQuery(_) => 400,
                JobError::SearchUnavailable(_) | JobError::SummarizationFailed(_) => 502,
                JobError::NoContentExtracted { .. } => 422,
                JobError::InvalidBlock { .. } | JobError::InvalidConfig(_) => 500,
                JobError::Cancelled => 503,
            },
            ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::Job(error) => write!(f, "{}", error),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<JobError> for ApiError {
    fn from(error: JobError) -> Self {
        ApiError::Job(error)
    }
}

/// Error response wrapper carrying the caller's request id
pub struct ApiErrorResponse {
    pub error: ApiError,
    pub request_id: Option<String>,
}

impl ApiErrorResponse {
    pub fn new(error: impl Into<ApiError>, request_id: Option<String>) -> Self {
        Self {
            error: error.into(),
            request_id,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let error_response = self.error.to_response(self.request_id);

        (status, Json(error_response)).into_response()
    }
}
