// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for web search

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Configuration for the search client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Provider-specific configuration
    pub providers: SearchProviderConfig,
    /// Number of candidate documents requested per job
    pub top_k: usize,
    /// Rate limit (requests per minute) across all jobs sharing the service
    pub rate_limit_per_minute: u32,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

/// Provider-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchProviderConfig {
    /// Brave Search API key
    #[serde(skip_serializing)]
    pub brave_api_key: Option<String>,
    /// Bing Search API key
    #[serde(skip_serializing)]
    pub bing_api_key: Option<String>,
    /// Preferred search provider, tried before the others
    pub preferred_provider: String,
}

impl SearchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            providers: SearchProviderConfig {
                brave_api_key: env::var("BRAVE_API_KEY").ok(),
                bing_api_key: env::var("BING_API_KEY")
                    .or_else(|_| env::var("BING_SEARCH_V7_SUBSCRIPTION_KEY"))
                    .ok(),
                preferred_provider: env::var("SEARCH_PROVIDER")
                    .unwrap_or(defaults.providers.preferred_provider),
            },
            top_k: env::var("SEARCH_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.top_k),
            rate_limit_per_minute: env::var("SEARCH_RATE_LIMIT_PER_MINUTE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_per_minute),
            request_timeout_ms: env::var("SEARCH_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_ms),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == 0 {
            return Err("top_k must be at least 1".to_string());
        }
        if self.rate_limit_per_minute == 0 {
            return Err("Rate limit must be greater than 0".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("Search timeout must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Check if any search provider is configured
    pub fn has_any_provider(&self) -> bool {
        self.providers
            .brave_api_key
            .as_deref()
            .is_some_and(|k| !k.is_empty())
            || self
                .providers
                .bing_api_key
                .as_deref()
                .is_some_and(|k| !k.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            providers: SearchProviderConfig::default(),
            top_k: 10,
            rate_limit_per_minute: 60,
            request_timeout_ms: 10_000,
        }
    }
}

impl Default for SearchProviderConfig {
    fn default() -> Self {
        Self {
            brave_api_key: None,
            bing_api_key: None,
            preferred_provider: "bing".to_string(),
        }
    }
}
