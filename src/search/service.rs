// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search service orchestration
//!
//! Coordinates search providers and rate limiting.

use std::time::Instant;
use tracing::{debug, info, warn};

use super::bing::BingSearchProvider;
use super::brave::BraveSearchProvider;
use super::config::SearchConfig;
use super::provider::SearchProvider;
use super::rate_limiter::SearchRateLimiter;
use super::types::{SearchError, SearchResult};

/// Search service that fails over across providers in priority order
pub struct SearchService {
    providers: Vec<Box<dyn SearchProvider>>,
    rate_limiter: SearchRateLimiter,
}

impl SearchService {
    /// Create a new search service from configuration
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let mut providers: Vec<Box<dyn SearchProvider>> = Vec::new();
        let timeout = config.request_timeout();

        if let Some(api_key) = config.providers.brave_api_key.as_ref().filter(|k| !k.is_empty()) {
            providers.push(Box::new(BraveSearchProvider::new(api_key.clone(), timeout)?));
            debug!("Brave Search provider enabled");
        }

        if let Some(api_key) = config.providers.bing_api_key.as_ref().filter(|k| !k.is_empty()) {
            providers.push(Box::new(BingSearchProvider::new(api_key.clone(), timeout)?));
            debug!("Bing Search provider enabled");
        }

        if providers.is_empty() {
            warn!("No search provider configured; every job will fail at the search stage");
        }

        Ok(Self::with_providers(
            providers,
            &config.providers.preferred_provider,
            config.rate_limit_per_minute,
        ))
    }

    /// Create a search service from explicit providers
    ///
    /// Providers are ordered by priority, with `preferred` moved to the front.
    pub fn with_providers(
        mut providers: Vec<Box<dyn SearchProvider>>,
        preferred: &str,
        rate_limit_per_minute: u32,
    ) -> Self {
        providers.sort_by_key(|p| (p.name() != preferred, p.priority()));

        Self {
            providers,
            rate_limiter: SearchRateLimiter::new(rate_limit_per_minute),
        }
    }

    /// Search the web and return up to `top_k` ranked candidate locations
    ///
    /// # Errors
    /// * `InvalidQuery` - empty query or `top_k == 0`
    /// * `RateLimited` - local quota exhausted
    /// * `ProviderUnavailable` - every configured provider failed or none is configured
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidQuery {
                reason: "query cannot be empty".to_string(),
            });
        }
        if top_k == 0 {
            return Err(SearchError::InvalidQuery {
                reason: "top_k must be at least 1".to_string(),
            });
        }

        self.rate_limiter.check()?;

        let start = Instant::now();

        for provider in &self.providers {
            if !provider.is_available() {
                continue;
            }

            debug!("Trying search provider: {}", provider.name());

            match provider.search(query, top_k).await {
                Ok(hits) => {
                    let results = SearchResult::from_hits(hits, top_k);
                    info!(
                        "Search complete: {} results from {} in {}ms",
                        results.len(),
                        provider.name(),
                        start.elapsed().as_millis()
                    );
                    return Ok(results);
                }
                Err(e) => {
                    warn!(
                        "Search provider {} failed: {}, trying next",
                        provider.name(),
                        e
                    );
                }
            }
        }

        Err(SearchError::ProviderUnavailable {
            provider: "all".to_string(),
        })
    }

    /// Get list of available provider names, in the order they are tried
    pub fn available_providers(&self) -> Vec<&str> {
        self.providers
            .iter()
            .filter(|p| p.is_available())
            .map(|p| p.name())
            .collect()
    }
}
