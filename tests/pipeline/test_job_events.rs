// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Progress event ordering across sinks and concurrent jobs

use super::common::*;
use fabstir_web_researcher::{
    pipeline::JobError,
    progress::{BroadcastEventSink, EventSink, FanoutEventSink, MemoryEventSink},
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

fn three_page_fetcher() -> StubFetcher {
    (0..3).fold(StubFetcher::new(), |f, i| {
        f.page(location(i), Page::Text(text_of_rendered_len(6_000, 'x')))
    })
}

#[tokio::test]
async fn test_broadcast_subscriber_sees_full_sequence() {
    let memory = Arc::new(MemoryEventSink::new());
    let broadcast = Arc::new(BroadcastEventSink::new());
    let sinks: Vec<Arc<dyn EventSink>> = vec![memory.clone(), broadcast.clone()];
    let pipeline = Arc::new(build_pipeline(
        StubSearch::with_results(3),
        Arc::new(three_page_fetcher()),
        Arc::new(EchoCompletion::capped(10)),
        Arc::new(FanoutEventSink::new(sinks)),
        test_config(),
    ));

    let job_id = Uuid::new_v4();
    let mut rx = broadcast.subscribe(job_id);
    let runner = Arc::clone(&pipeline);
    let job = tokio::spawn(async move {
        runner
            .run_job_with(job_id, "events", runner.config(), CancellationToken::new())
            .await
    });

    let mut received = Vec::new();
    while let Ok(event) = rx.recv().await {
        received.push((event.stage, event.status));
    }

    assert!(job.await.unwrap().is_ok());
    assert_eq!(received, successful_sequence());
    assert_eq!(stages(&memory, job_id), successful_sequence());
    assert_eq!(broadcast.active_jobs(), 0);
}

#[tokio::test]
async fn test_concurrent_jobs_keep_separate_sequences_and_settings() {
    let sink = Arc::new(MemoryEventSink::new());
    let pipeline = build_pipeline(
        StubSearch::with_results(3),
        Arc::new(three_page_fetcher()),
        Arc::new(EchoCompletion::capped(10)),
        sink.clone(),
        test_config(),
    );

    let mut small = test_config();
    small.summarize.char_budget = 6_000;
    let mut large = test_config();
    large.summarize.char_budget = 20_000;

    let (a, b) = tokio::join!(
        pipeline.run_job_with_config("small blocks", Arc::new(small)),
        pipeline.run_job_with_config("large blocks", Arc::new(large)),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.blocks.len(), 3);
    assert_eq!(b.blocks.len(), 1);
    assert_ne!(a.job_id, b.job_id);
    assert_eq!(stages(&sink, a.job_id), successful_sequence());
    assert_eq!(stages(&sink, b.job_id), successful_sequence());
}

#[tokio::test]
async fn test_event_details_describe_progress() {
    let sink = Arc::new(MemoryEventSink::new());
    let pipeline = build_pipeline(
        StubSearch::with_results(5),
        Arc::new(three_page_fetcher()),
        Arc::new(EchoCompletion::capped(10)),
        sink.clone(),
        test_config(),
    );

    let report = pipeline.run_job_report("details").await.unwrap();
    let details: Vec<Option<String>> = sink
        .events_for(report.job_id)
        .into_iter()
        .map(|e| e.detail)
        .collect();

    assert_eq!(details[0], None);
    assert_eq!(details[1].as_deref(), Some("5 results"));
    assert_eq!(details[3].as_deref(), Some("3 of 5 documents extracted"));
    assert_eq!(details[5].as_deref(), Some("2 blocks"));
    assert_eq!(details[7].as_deref(), Some("2 of 2 blocks summarized"));
}

#[tokio::test]
async fn test_rejected_job_config_emits_no_events() {
    let sink = Arc::new(MemoryEventSink::new());
    let completions = Arc::new(EchoCompletion::new());
    let pipeline = build_pipeline(
        StubSearch::with_results(3),
        Arc::new(three_page_fetcher()),
        completions.clone(),
        sink.clone(),
        test_config(),
    );

    let mut config = test_config();
    config.summarize.final_word_limit = 0;
    let result = pipeline.run_job_with_config("q", Arc::new(config)).await;

    assert_eq!(result.unwrap_err().kind(), "invalid_config");
    assert!(sink.all().is_empty());
    assert_eq!(completions.request_count(), 0);

    let mut config = test_config();
    config.search.top_k = 0;
    let result = pipeline.run_job_with_config("q", Arc::new(config)).await;
    assert!(matches!(result, Err(JobError::InvalidConfig(_))));
    assert!(sink.all().is_empty());
}
