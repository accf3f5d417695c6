// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for content fetching

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Configuration for content fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentFetchConfig {
    /// Maximum concurrent page fetches per job (default: 8)
    pub workers: usize,
    /// Timeout per page fetch in seconds (default: 10)
    pub timeout_per_page_secs: u64,
    /// Maximum redirects followed per page (default: 5)
    pub max_redirects: usize,
    /// User agent sent with every fetch
    pub user_agent: String,
}

impl ContentFetchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            workers: env::var("CONTENT_FETCH_WORKERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.workers),
            timeout_per_page_secs: env::var("CONTENT_FETCH_TIMEOUT_PER_PAGE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_per_page_secs),
            max_redirects: env::var("CONTENT_FETCH_MAX_REDIRECTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_redirects),
            user_agent: env::var("CONTENT_FETCH_USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("content workers must be at least 1".to_string());
        }
        if self.timeout_per_page_secs == 0 {
            return Err("timeout_per_page_secs must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn timeout_per_page(&self) -> Duration {
        Duration::from_secs(self.timeout_per_page_secs)
    }
}

impl Default for ContentFetchConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            timeout_per_page_secs: 10,
            max_redirects: 5,
            user_agent: "Mozilla/5.0 (compatible; FabstirResearcher/0.1; +https://fabstir.com)"
                .to_string(),
        }
    }
}
