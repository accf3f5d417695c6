// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bing Search API provider
//!
//! Implements web search using Microsoft Bing Web Search API v7,
//! restricted to webpage results in the en-US market.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::provider::{fetch_json, SearchProvider};
use super::types::{SearchError, SearchHit};

const BING_API_URL: &str = "https://api.bing.microsoft.com/v7.0/search";
const BING_MARKET: &str = "en-US";

/// Bing Search API provider
pub struct BingSearchProvider {
    api_key: String,
    client: Client,
    timeout: Duration,
}

impl BingSearchProvider {
    /// Create a new Bing Search provider
    ///
    /// # Arguments
    /// * `api_key` - Bing Search subscription key
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
impl SearchProvider for BingSearchProvider {
    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let request = self
            .client
            .get(BING_API_URL)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .query(&[
                ("q", query),
                ("mkt", BING_MARKET),
                ("count", &num_results.min(50).to_string()),
                ("responseFilter", "Webpages"),
            ]);
        let data: BingResponse = fetch_json(request, self.name(), self.timeout).await?;

        Ok(data.into_hits())
    }

    fn name(&self) -> &'static str {
        "bing"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn priority(&self) -> u8 {
        20
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingResponse {
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, serde::Deserialize)]
struct BingWebPages {
    value: Vec<BingResult>,
}

#[derive(Debug, serde::Deserialize)]
struct BingResult {
    name: String,
    url: String,
    #[serde(default)]
    snippet: String,
}

impl BingResponse {
    fn into_hits(self) -> Vec<SearchHit> {
        self.web_pages
            .map(|pages| {
                pages
                    .value
                    .into_iter()
                    .map(|r| SearchHit {
                        title: r.name,
                        url: r.url,
                        snippet: r.snippet,
                        source: "bing".to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
