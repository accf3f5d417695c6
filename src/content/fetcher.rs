// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP document fetching
//!
//! Retrieves the raw markup behind a search result. Text selection happens in
//! [`super::extractor`]; this module only moves bytes.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect, Client};
use std::error::Error as StdError;
use std::net::{Ipv4Addr, Ipv6Addr};
use thiserror::Error;
use tracing::debug;
use url::{Host, Url};

use super::config::ContentFetchConfig;
use crate::pipeline::retry::Retryable;

/// Raw page content as returned by a fetch
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub location: Url,
    /// `Content-Type` header value, if the server sent one
    pub content_type: Option<String>,
    pub body: String,
}

/// Content fetch error types
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Timeout fetching: {0}")]
    Timeout(String),
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("HTTP {0} for: {1}")]
    HttpStatus(u16, String),
    #[error("Non-text content ({content_type}) at: {url}")]
    NonTextContent { url: String, content_type: String },
    #[error("No content extracted from: {0}")]
    NoContent(String),
    /// URL is unsafe (localhost, private IP, non-http scheme)
    #[error("Unsafe URL blocked: {0}")]
    UnsafeUrl(String),
    #[error("Too many redirects ({max}) at: {url}")]
    TooManyRedirects { url: String, max: usize },
    #[error("Fetch task did not complete: {0}")]
    Aborted(String),
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::HttpError(_) => true,
            Self::HttpStatus(code, _) => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

/// Capability to fetch the raw content at a location
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, location: &Url) -> Result<RawDocument, FetchError>;
}

/// `reqwest`-backed fetcher
pub struct HttpDocumentFetcher {
    client: Client,
}

impl HttpDocumentFetcher {
    /// Create a new fetcher; the per-page timeout is enforced by the caller
    pub fn new(config: &ContentFetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(redirect_policy(config.max_redirects))
            .build()
            .map_err(|e| FetchError::HttpError(e.to_string()))?;

        Ok(Self { client })
    }

    /// Check if URL is safe to fetch (http/https, not localhost or a private address)
    pub fn is_safe_url(url: &Url) -> bool {
        if !["http", "https"].contains(&url.scheme()) {
            return false;
        }

        match url.host() {
            Some(Host::Domain(domain)) => {
                let domain = domain.to_ascii_lowercase();
                domain != "localhost" && !domain.ends_with(".localhost")
            }
            Some(Host::Ipv4(ip)) => is_public_ipv4(ip),
            Some(Host::Ipv6(ip)) => is_public_ipv6(ip),
            None => false,
        }
    }
}

/// Follow at most `max_redirects` hops, and only to locations that pass
/// [`HttpDocumentFetcher::is_safe_url`]
fn redirect_policy(max_redirects: usize) -> redirect::Policy {
    redirect::Policy::custom(move |attempt| {
        match check_redirect(attempt.url(), attempt.previous().len(), max_redirects) {
            Ok(()) => attempt.follow(),
            Err(e) => attempt.error(e),
        }
    })
}

/// Decide one redirect hop; `hops` counts the locations already visited
fn check_redirect(next: &Url, hops: usize, max_redirects: usize) -> Result<(), FetchError> {
    if hops > max_redirects {
        return Err(FetchError::TooManyRedirects {
            url: next.to_string(),
            max: max_redirects,
        });
    }
    if !HttpDocumentFetcher::is_safe_url(next) {
        return Err(FetchError::UnsafeUrl(next.to_string()));
    }
    Ok(())
}

/// Recover the policy's verdict from a failed redirect
fn redirect_error(e: &reqwest::Error, location: &Url) -> FetchError {
    e.source()
        .and_then(|source| source.downcast_ref::<FetchError>())
        .cloned()
        .unwrap_or_else(|| FetchError::HttpError(format!("redirect from {}: {}", location, e)))
}

fn is_public_ipv4(ip: Ipv4Addr) -> bool {
    !(ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast())
}

fn is_public_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_public_ipv4(mapped);
    }
    let first = ip.segments()[0];
    let unique_local = (first & 0xfe00) == 0xfc00;
    let link_local = (first & 0xffc0) == 0xfe80;
    !(ip.is_loopback() || ip.is_unspecified() || unique_local || link_local)
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, location: &Url) -> Result<RawDocument, FetchError> {
        if !Self::is_safe_url(location) {
            return Err(FetchError::UnsafeUrl(location.to_string()));
        }

        debug!("Fetching content from: {}", location);

        let response = self
            .client
            .get(location.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(location.to_string())
                } else if e.is_redirect() {
                    redirect_error(&e, location)
                } else {
                    FetchError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16(), location.to_string()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::HttpError(e.to_string()))?;

        Ok(RawDocument {
            location: location.clone(),
            content_type,
            body,
        })
    }
}
