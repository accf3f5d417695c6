// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Brave Search API provider

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::provider::{fetch_json, SearchProvider};
use super::types::{SearchError, SearchHit};

const BRAVE_API_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Brave Search API provider
pub struct BraveSearchProvider {
    api_key: String,
    client: Client,
    timeout: Duration,
}

impl BraveSearchProvider {
    /// Create a new Brave Search provider
    ///
    /// # Arguments
    /// * `api_key` - Brave Search API key
    /// * `timeout` - Per-request timeout
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Client(e.to_string()))?;

        Ok(Self {
            api_key,
            client,
            timeout,
        })
    }
}

#[async_trait]
impl SearchProvider for BraveSearchProvider {
    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let request = self
            .client
            .get(BRAVE_API_URL)
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("q", query), ("count", &num_results.min(20).to_string())]);
        let data: BraveResponse = fetch_json(request, self.name(), self.timeout).await?;

        Ok(data.into_hits())
    }

    fn name(&self) -> &'static str {
        "brave"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn priority(&self) -> u8 {
        10
    }
}

/// Subset of the Brave answer we read: ranked web results only
#[derive(Debug, serde::Deserialize)]
struct BraveResponse {
    web: Option<BraveWebResults>,
}

#[derive(Debug, serde::Deserialize)]
struct BraveWebResults {
    results: Vec<BraveResult>,
}

#[derive(Debug, serde::Deserialize)]
struct BraveResult {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
}

impl BraveResponse {
    fn into_hits(self) -> Vec<SearchHit> {
        let Some(web) = self.web else {
            return Vec::new();
        };
        web.results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                snippet: r.description,
                source: "brave".to_string(),
            })
            .collect()
    }
}
