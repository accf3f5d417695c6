// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document extraction stage
//!
//! Fetches every search result on the worker pool and keeps the documents
//! whose narrative text could be extracted, in rank order. Individual
//! failures are recorded and dropped; the stage fails only when nothing
//! survives.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use super::config::ContentFetchConfig;
use super::extractor::{extract_document_text, is_text_content_type};
use super::fetcher::{DocumentFetcher, FetchError};
use crate::pipeline::{JobError, RetryPolicy, WorkerPool};
use crate::search::SearchResult;

/// Narrative text of one successfully fetched search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocument {
    pub location: Url,
    pub text: String,
}

/// A search result that produced no document
#[derive(Debug, Clone)]
pub struct ExtractionFailure {
    pub location: Url,
    pub error: FetchError,
}

#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// Surviving documents in rank order
    pub documents: Vec<ExtractedDocument>,
    pub failures: Vec<ExtractionFailure>,
}

impl ExtractionOutcome {
    pub fn attempted(&self) -> usize {
        self.documents.len() + self.failures.len()
    }
}

/// Fan-out stage turning search results into extracted documents
pub struct DocumentExtractor {
    fetcher: Arc<dyn DocumentFetcher>,
}

impl DocumentExtractor {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch and extract every result, joining on all of them.
    ///
    /// # Errors
    /// `JobError::NoContentExtracted` when no result yields text.
    pub async fn extract(
        &self,
        results: &[SearchResult],
        config: &ContentFetchConfig,
        retry: &RetryPolicy,
    ) -> Result<ExtractionOutcome, JobError> {
        let pool = WorkerPool::new(config.workers);
        let per_page = config.timeout_per_page();
        let locations: Vec<Url> = results.iter().map(|r| r.location.clone()).collect();

        let fetcher = Arc::clone(&self.fetcher);
        let retry = retry.clone();
        let outputs = pool
            .run(locations.clone(), move |location| {
                let fetcher = Arc::clone(&fetcher);
                let retry = retry.clone();
                async move { fetch_and_extract(fetcher.as_ref(), &location, per_page, &retry).await }
            })
            .await;

        let mut documents = Vec::new();
        let mut failures = Vec::new();
        for (location, output) in locations.into_iter().zip(outputs) {
            let error = match output {
                Some(Ok(document)) => {
                    documents.push(document);
                    continue;
                }
                Some(Err(e)) => e,
                None => FetchError::Aborted(location.to_string()),
            };
            warn!("Dropping {}: {}", location, error);
            failures.push(ExtractionFailure { location, error });
        }

        info!(
            "Extracted {} of {} documents",
            documents.len(),
            documents.len() + failures.len()
        );

        if documents.is_empty() {
            return Err(JobError::NoContentExtracted {
                attempted: failures.len(),
            });
        }

        Ok(ExtractionOutcome {
            documents,
            failures,
        })
    }
}

async fn fetch_and_extract(
    fetcher: &dyn DocumentFetcher,
    location: &Url,
    per_page: Duration,
    retry: &RetryPolicy,
) -> Result<ExtractedDocument, FetchError> {
    let raw = retry
        .run("fetch", move || async move {
            tokio::time::timeout(per_page, fetcher.fetch(location))
                .await
                .map_err(|_| FetchError::Timeout(location.to_string()))?
        })
        .await?;

    if let Some(content_type) = raw.content_type.as_deref() {
        if !is_text_content_type(content_type) {
            return Err(FetchError::NonTextContent {
                url: location.to_string(),
                content_type: content_type.to_string(),
            });
        }
    }

    let text = extract_document_text(&raw.body, raw.content_type.as_deref())
        .render()
        .ok_or_else(|| FetchError::NoContent(location.to_string()))?;

    Ok(ExtractedDocument {
        location: location.clone(),
        text,
    })
}
