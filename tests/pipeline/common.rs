// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Stub collaborators shared by the pipeline and API tests

#![allow(dead_code)]

use async_trait::async_trait;
use fabstir_web_researcher::{
    config::PipelineConfig,
    content::{DocumentFetcher, FetchError, RawDocument},
    pipeline::{ResearchPipeline, RetryPolicy},
    progress::{EventSink, EventStatus, MemoryEventSink, ProcessingEvent, Stage},
    search::{SearchError, SearchHit, SearchProvider, SearchService},
    summarize::{Completion, CompletionError, CompletionProvider, CompletionRequest},
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

pub fn location(i: usize) -> String {
    format!("https://site{}.example/article", i)
}

/// Search provider answering every query with fixed locations
pub struct StubSearch {
    pub locations: Vec<String>,
    pub fail: bool,
}

impl StubSearch {
    pub fn with_results(count: usize) -> Self {
        Self {
            locations: (0..count).map(location).collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            locations: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(&self, _query: &str, num_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        if self.fail {
            return Err(SearchError::ApiError {
                status: 503,
                message: "stub outage".to_string(),
            });
        }
        Ok(self
            .locations
            .iter()
            .take(num_results)
            .enumerate()
            .map(|(i, url)| SearchHit {
                title: format!("Result {}", i),
                url: url.clone(),
                snippet: String::new(),
                source: "stub".to_string(),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "stub"
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[derive(Clone)]
pub enum Page {
    Text(String),
    Html(String),
    Missing,
    Slow(Duration, String),
    /// Fails with HTTP 503 this many times, then serves the text
    Flaky(usize, String),
}

/// Fetcher serving pages from a map; unknown locations are 404s
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, Page>,
    pub attempts: Mutex<HashMap<String, usize>>,
    pub completed: AtomicUsize,
    running: AtomicUsize,
    pub peak_concurrency: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, location: String, page: Page) -> Self {
        self.pages.insert(location, page);
        self
    }

    pub fn attempts_for(&self, location: &str) -> usize {
        self.attempts
            .lock()
            .unwrap()
            .get(location)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentFetcher for StubFetcher {
    async fn fetch(&self, location: &Url) -> Result<RawDocument, FetchError> {
        let key = location.to_string();
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let count = attempts.entry(key.clone()).or_insert(0);
            *count += 1;
            *count
        };

        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_concurrency.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;

        let result = match self.pages.get(&key).cloned().unwrap_or(Page::Missing) {
            Page::Text(body) => Ok(("text/plain", body)),
            Page::Html(body) => Ok(("text/html; charset=utf-8", body)),
            Page::Missing => Err(FetchError::HttpStatus(404, key.clone())),
            Page::Slow(delay, body) => {
                tokio::time::sleep(delay).await;
                Ok(("text/plain", body))
            }
            Page::Flaky(failures, body) => {
                if attempt <= failures {
                    Err(FetchError::HttpStatus(503, key.clone()))
                } else {
                    Ok(("text/plain", body))
                }
            }
        };
        self.running.fetch_sub(1, Ordering::SeqCst);

        let (content_type, body) = result?;
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(RawDocument {
            location: location.clone(),
            content_type: Some(content_type.to_string()),
            body,
        })
    }
}

/// Completion stub echoing the fenced content of each prompt
#[derive(Default)]
pub struct EchoCompletion {
    /// Echo at most this many words
    pub word_cap: Option<usize>,
    /// Prompts containing this text fail with a non-retryable error
    pub fail_marker: Option<String>,
    pub requests: Mutex<Vec<CompletionRequest>>,
    /// Time each request takes before answering
    pub delay: Option<Duration>,
    /// Requests that ran to an answer
    pub completed: AtomicUsize,
}

impl EchoCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capped(words: usize) -> Self {
        Self {
            word_cap: Some(words),
            ..Self::default()
        }
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionProvider for EchoCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(marker) = &self.fail_marker {
            if request.prompt.contains(marker.as_str()) {
                return Err(CompletionError::Api {
                    status: 400,
                    message: "stub rejection".to_string(),
                });
            }
        }

        let fenced = request.prompt.split("```").nth(1).unwrap_or_default().trim();
        let text = match self.word_cap {
            Some(cap) => fenced.split_whitespace().take(cap).collect::<Vec<_>>().join(" "),
            None => fenced.to_string(),
        };
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(Completion { text })
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

/// Defaults with retries off so failure tests stay fast
pub fn test_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.retry = RetryPolicy::none();
    config.content.timeout_per_page_secs = 2;
    config.summarize.request_timeout_secs = 2;
    config
}

pub fn build_pipeline(
    search: StubSearch,
    fetcher: Arc<StubFetcher>,
    completions: Arc<EchoCompletion>,
    sink: Arc<dyn EventSink>,
    config: PipelineConfig,
) -> ResearchPipeline {
    ResearchPipeline::new(
        SearchService::with_providers(vec![Box::new(search)], "stub", 6_000),
        fetcher,
        completions,
        sink,
        config,
    )
}

/// Body whose plain-text extraction renders to exactly `chars` characters
pub fn text_of_rendered_len(chars: usize, fill: char) -> String {
    fill.to_string().repeat(chars - 2)
}

pub fn stages(sink: &MemoryEventSink, job_id: Uuid) -> Vec<(Stage, EventStatus)> {
    sink.events_for(job_id)
        .into_iter()
        .map(|e: ProcessingEvent| (e.stage, e.status))
        .collect()
}

pub fn successful_sequence() -> Vec<(Stage, EventStatus)> {
    use EventStatus::*;
    vec![
        (Stage::Search, Started),
        (Stage::Search, Completed),
        (Stage::Extract, Started),
        (Stage::Extract, Completed),
        (Stage::Collate, Started),
        (Stage::Collate, Completed),
        (Stage::Summarize, Started),
        (Stage::Summarize, Completed),
        (Stage::Reduce, Started),
        (Stage::Reduce, Completed),
        (Stage::Done, Completed),
    ]
}
