// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for web search functionality

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// A single hit as returned by a search provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Title of the page
    pub title: String,
    /// URL of the page as reported by the provider
    pub url: String,
    /// Snippet/description of the page
    pub snippet: String,
    /// Source provider (e.g., "brave", "bing")
    pub source: String,
}

/// A candidate document location, ordered by rank (1 = best)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub location: Url,
    pub rank: u32,
}

impl SearchResult {
    /// Convert provider hits into ranked results.
    ///
    /// Rank is the 1-based position in the provider's answer. Hits whose URL
    /// does not parse are skipped before `top_k` is applied, so ranks may
    /// have gaps but later valid hits fill the list.
    pub fn from_hits(hits: Vec<SearchHit>, top_k: usize) -> Vec<SearchResult> {
        hits.into_iter()
            .enumerate()
            .filter_map(|(i, hit)| {
                Url::parse(&hit.url).ok().map(|location| SearchResult {
                    location,
                    rank: i as u32 + 1,
                })
            })
            .take(top_k)
            .collect()
    }
}

/// Errors that can occur during search operations
#[derive(Debug, Error)]
pub enum SearchError {
    /// Rate limited by the search provider or the local limiter
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// API error from the search provider
    #[error("Search API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Search request timed out
    #[error("Search timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Search provider is unavailable
    #[error("Provider unavailable: {provider}")]
    ProviderUnavailable {
        /// Name of the unavailable provider
        provider: String,
    },

    /// No API key configured for the provider, or the key was rejected
    #[error("No API key configured for {provider}")]
    NoApiKey {
        /// Name of the provider missing API key
        provider: String,
    },

    /// Invalid search query
    #[error("Invalid query: {reason}")]
    InvalidQuery {
        /// Reason the query is invalid
        reason: String,
    },

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}
