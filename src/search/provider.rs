// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search provider trait definition

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::types::{SearchError, SearchHit};

/// Wait assumed when a 429 carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Trait for implementing search providers
///
/// Multiple providers can be configured; the search service tries them in
/// priority order and returns the first successful answer.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Perform a web search
    ///
    /// # Arguments
    /// * `query` - The search query string
    /// * `num_results` - Maximum number of results to return
    async fn search(&self, query: &str, num_results: usize)
        -> Result<Vec<SearchHit>, SearchError>;

    /// Get the provider name for logging
    fn name(&self) -> &'static str;

    /// Check if the provider is available (has API key, etc.)
    fn is_available(&self) -> bool;

    /// Get provider priority (lower = preferred)
    fn priority(&self) -> u8 {
        100
    }
}

/// Send a provider request and decode its JSON answer.
///
/// Transport timeouts, throttling, rejected keys and non-2xx answers map to
/// the matching [`SearchError`] so the service can fail over.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    provider: &'static str,
    timeout: Duration,
) -> Result<T, SearchError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            SearchError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }
        } else {
            SearchError::ApiError {
                status: 0,
                message: e.to_string(),
            }
        }
    })?;

    let response = check_status(response, provider).await?;
    response.json().await.map_err(|e| SearchError::ApiError {
        status: 0,
        message: format!("{} returned malformed JSON: {}", provider, e),
    })
}

async fn check_status(response: Response, provider: &'static str) -> Result<Response, SearchError> {
    match response.status() {
        StatusCode::TOO_MANY_REQUESTS => Err(SearchError::RateLimited {
            retry_after_secs: retry_after_secs(&response),
        }),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SearchError::NoApiKey {
            provider: provider.to_string(),
        }),
        status if status.is_success() => Ok(response),
        status => Err(SearchError::ApiError {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        }),
    }
}

fn retry_after_secs(response: &Response) -> u64 {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}
