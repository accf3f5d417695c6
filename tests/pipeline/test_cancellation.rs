// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Job cancellation reaches in-flight fetches

use super::common::*;
use fabstir_web_researcher::{
    pipeline::JobError,
    progress::{EventStatus, MemoryEventSink, Stage},
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[tokio::test]
async fn test_cancel_during_extraction_aborts_fetches() {
    let mut fetcher = StubFetcher::new();
    for i in 0..4 {
        fetcher = fetcher.page(
            location(i),
            Page::Slow(Duration::from_secs(30), "never read".to_string()),
        );
    }
    let fetcher = Arc::new(fetcher);
    let sink = Arc::new(MemoryEventSink::new());
    let mut config = test_config();
    config.content.timeout_per_page_secs = 60;
    let pipeline = build_pipeline(
        StubSearch::with_results(4),
        fetcher.clone(),
        Arc::new(EchoCompletion::new()),
        sink.clone(),
        config,
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let job_id = Uuid::new_v4();
    let start = Instant::now();
    let result = pipeline
        .run_job_with(job_id, "slow pages", pipeline.config(), cancel)
        .await;

    assert_eq!(result.unwrap_err(), JobError::Cancelled);
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(
        stages(&sink, job_id).last(),
        Some(&(Stage::Extract, EventStatus::Failed))
    );

    // Aborted units never finish their fetch
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fetcher.completed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_uncancelled_token_does_not_interfere() {
    let fetcher = StubFetcher::new().page(location(0), Page::Text("fine".to_string()));
    let pipeline = build_pipeline(
        StubSearch::with_results(1),
        Arc::new(fetcher),
        Arc::new(EchoCompletion::new()),
        Arc::new(MemoryEventSink::new()),
        test_config(),
    );

    let report = pipeline
        .run_job_with_cancel("q", CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.summary.text, "fine");
}

#[tokio::test]
async fn test_cancel_during_map_phase_aborts_completions() {
    let fetcher = (0..3).fold(StubFetcher::new(), |f, i| {
        f.page(location(i), Page::Text(text_of_rendered_len(10_000, 'y')))
    });
    let completions = Arc::new(EchoCompletion::slow(Duration::from_secs(30)));
    let sink = Arc::new(MemoryEventSink::new());
    let mut config = test_config();
    config.summarize.request_timeout_secs = 60;
    let pipeline = build_pipeline(
        StubSearch::with_results(3),
        Arc::new(fetcher),
        completions.clone(),
        sink.clone(),
        config,
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let job_id = Uuid::new_v4();
    let start = Instant::now();
    let result = pipeline
        .run_job_with(job_id, "slow model", pipeline.config(), cancel)
        .await;

    assert_eq!(result.unwrap_err(), JobError::Cancelled);
    assert!(start.elapsed() < Duration::from_secs(5));

    let seen = stages(&sink, job_id);
    assert_eq!(seen.last(), Some(&(Stage::Summarize, EventStatus::Failed)));
    assert!(!seen.iter().any(|(stage, _)| *stage == Stage::Reduce));

    // Three 10,000-char documents make three blocks, all in flight
    assert_eq!(completions.request_count(), 3);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(completions.completed.load(Ordering::SeqCst), 0);
}
