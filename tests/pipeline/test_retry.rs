// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Retry behavior of per-document fetches

use super::common::*;
use fabstir_web_researcher::{
    pipeline::{JobError, JobWarning, RetryPolicy},
    progress::MemoryEventSink,
};
use std::sync::Arc;

fn quick_retries() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        initial_backoff_ms: 1,
        max_backoff_ms: 5,
    }
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let fetcher = Arc::new(
        StubFetcher::new().page(location(0), Page::Flaky(2, "recovered page".to_string())),
    );
    let mut config = test_config();
    config.retry = quick_retries();
    let pipeline = build_pipeline(
        StubSearch::with_results(1),
        fetcher.clone(),
        Arc::new(EchoCompletion::new()),
        Arc::new(MemoryEventSink::new()),
        config,
    );

    let report = pipeline.run_job_report("retry").await.unwrap();

    assert_eq!(fetcher.attempts_for(&location(0)), 3);
    assert_eq!(report.summary.text, "recovered page");
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn test_exhausted_retries_drop_the_document() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .page(location(0), Page::Flaky(5, "never served".to_string()))
            .page(location(1), Page::Text("steady page".to_string())),
    );
    let mut config = test_config();
    config.retry = quick_retries();
    let pipeline = build_pipeline(
        StubSearch::with_results(2),
        fetcher.clone(),
        Arc::new(EchoCompletion::new()),
        Arc::new(MemoryEventSink::new()),
        config,
    );

    let report = pipeline.run_job_report("retry").await.unwrap();

    assert_eq!(fetcher.attempts_for(&location(0)), 3);
    assert_eq!(
        report.warnings,
        vec![JobWarning::PartialExtractionFailure { failed: 1, total: 2 }]
    );
}

#[tokio::test]
async fn test_no_retries_means_single_attempt() {
    let fetcher = Arc::new(
        StubFetcher::new().page(location(0), Page::Flaky(1, "second try".to_string())),
    );
    let pipeline = build_pipeline(
        StubSearch::with_results(1),
        fetcher.clone(),
        Arc::new(EchoCompletion::new()),
        Arc::new(MemoryEventSink::new()),
        test_config(),
    );

    let result = pipeline.run_job_report("retry").await;

    assert_eq!(result.unwrap_err(), JobError::NoContentExtracted { attempted: 1 });
    assert_eq!(fetcher.attempts_for(&location(0)), 1);
}

#[tokio::test]
async fn test_permanent_failures_are_not_retried() {
    let fetcher = Arc::new(
        StubFetcher::new().page(location(1), Page::Text("present".to_string())),
    );
    let mut config = test_config();
    config.retry = quick_retries();
    let pipeline = build_pipeline(
        StubSearch::with_results(2),
        fetcher.clone(),
        Arc::new(EchoCompletion::new()),
        Arc::new(MemoryEventSink::new()),
        config,
    );

    pipeline.run_job_report("retry").await.unwrap();

    // location(0) has no page, so it answers 404
    assert_eq!(fetcher.attempts_for(&location(0)), 1);
    assert_eq!(fetcher.attempts_for(&location(1)), 1);
}
