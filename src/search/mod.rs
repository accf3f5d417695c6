// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search client
//!
//! Issues one web search per job and returns the ranked candidate locations
//! the document extractor fetches. Providers are tried in priority order;
//! the first provider to answer wins. There is no retry at this layer.

pub mod bing;
pub mod brave;
pub mod config;
pub mod provider;
pub mod rate_limiter;
pub mod service;
pub mod types;

pub use config::{SearchConfig, SearchProviderConfig};
pub use provider::SearchProvider;
pub use service::SearchService;
pub use types::{SearchError, SearchHit, SearchResult};
