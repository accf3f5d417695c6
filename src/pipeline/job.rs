// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Research job runner

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::{JobError, JobWarning};
use crate::collate::{collate, ContentBlock};
use crate::config::{ConfigError, PipelineConfig};
use crate::content::{DocumentExtractor, DocumentFetcher, ExtractedDocument, HttpDocumentFetcher};
use crate::progress::{EventSink, EventStatus, ProcessingEvent, Stage};
use crate::search::{SearchResult, SearchService};
use crate::summarize::{
    BlockSummary, CompletionProvider, FinalSummary, OpenAiCompletionClient, PromptBuilder,
    SummaryPrompt, Summarizer,
};

/// Everything a successful job produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchReport {
    pub job_id: Uuid,
    pub query: String,
    pub summary: FinalSummary,
    pub warnings: Vec<JobWarning>,
    pub search_results: Vec<SearchResult>,
    pub documents: Vec<ExtractedDocument>,
    pub blocks: Vec<ContentBlock>,
    pub block_summaries: Vec<BlockSummary>,
    pub elapsed_ms: u64,
}

/// Runs research jobs: search, extract, collate, summarize, reduce
///
/// The pipeline holds the long-lived clients. Each job reads its settings from
/// a [`PipelineConfig`] snapshot; search providers, the fetch client and the
/// completion endpoint are fixed when the pipeline is built.
pub struct ResearchPipeline {
    search: Arc<SearchService>,
    extractor: DocumentExtractor,
    summarizer: Summarizer,
    sink: Arc<dyn EventSink>,
    config: Arc<PipelineConfig>,
}

impl ResearchPipeline {
    pub fn new(
        search: SearchService,
        fetcher: Arc<dyn DocumentFetcher>,
        completions: Arc<dyn CompletionProvider>,
        sink: Arc<dyn EventSink>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            search: Arc::new(search),
            extractor: DocumentExtractor::new(fetcher),
            summarizer: Summarizer::new(completions),
            sink,
            config: Arc::new(config),
        }
    }

    /// Build the HTTP-backed clients described by `config`
    pub fn from_config(
        config: PipelineConfig,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let search = SearchService::new(&config.search).map_err(|e| ConfigError::Component {
            component: "search service",
            reason: e.to_string(),
        })?;
        let fetcher =
            HttpDocumentFetcher::new(&config.content).map_err(|e| ConfigError::Component {
                component: "document fetcher",
                reason: e.to_string(),
            })?;
        let completions =
            OpenAiCompletionClient::new(&config.llm).map_err(|e| ConfigError::Component {
                component: "completion client",
                reason: e.to_string(),
            })?;

        Ok(Self::new(
            search,
            Arc::new(fetcher),
            Arc::new(completions),
            sink,
            config,
        ))
    }

    /// Default configuration snapshot for new jobs
    pub fn config(&self) -> Arc<PipelineConfig> {
        Arc::clone(&self.config)
    }

    pub fn search_providers(&self) -> Vec<&str> {
        self.search.available_providers()
    }

    pub fn model_name(&self) -> &str {
        self.summarizer.model_name()
    }

    /// Run a job and return its final summary
    pub async fn run_job(&self, query: &str) -> Result<FinalSummary, JobError> {
        self.run_job_report(query).await.map(|report| report.summary)
    }

    /// Run a job and return the full report
    pub async fn run_job_report(&self, query: &str) -> Result<ResearchReport, JobError> {
        self.run_job_with(Uuid::new_v4(), query, self.config(), CancellationToken::new())
            .await
    }

    /// Run a job with settings other than the pipeline defaults
    pub async fn run_job_with_config(
        &self,
        query: &str,
        config: Arc<PipelineConfig>,
    ) -> Result<ResearchReport, JobError> {
        self.run_job_with(Uuid::new_v4(), query, config, CancellationToken::new())
            .await
    }

    /// Run a job that stops with `JobError::Cancelled` once `cancel` fires
    pub async fn run_job_with_cancel(
        &self,
        query: &str,
        cancel: CancellationToken,
    ) -> Result<ResearchReport, JobError> {
        self.run_job_with(Uuid::new_v4(), query, self.config(), cancel)
            .await
    }

    /// Run a job under a caller-chosen id, so progress can be subscribed to
    /// before the first event is emitted.
    ///
    /// An invalid query or configuration is rejected before any event. Otherwise the job emits
    /// STARTED and a terminal event for each stage it reaches, then `DONE`,
    /// or stops after the first `FAILED` event.
    pub async fn run_job_with(
        &self,
        job_id: Uuid,
        query: &str,
        config: Arc<PipelineConfig>,
        cancel: CancellationToken,
    ) -> Result<ResearchReport, JobError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(JobError::InvalidQuery("query cannot be empty".to_string()));
        }
        config
            .validate()
            .map_err(|e| JobError::InvalidConfig(e.to_string()))?;

        info!(%job_id, "Starting research job for query '{}'", query);
        let start = Instant::now();
        let mut progress = JobProgress::new(job_id, self.sink.as_ref());

        let outcome = self
            .execute(job_id, query, &config, &cancel, &mut progress, start)
            .await;

        match &outcome {
            Ok(report) => {
                progress.done(report.elapsed_ms);
                info!(
                    %job_id,
                    "Research job finished in {}ms with {} warnings",
                    report.elapsed_ms,
                    report.warnings.len()
                );
            }
            Err(e) => {
                progress.fail(e);
                warn!(%job_id, "Research job failed: {}", e);
            }
        }
        outcome
    }

    async fn execute(
        &self,
        job_id: Uuid,
        query: &str,
        config: &PipelineConfig,
        cancel: &CancellationToken,
        progress: &mut JobProgress<'_>,
        start: Instant,
    ) -> Result<ResearchReport, JobError> {
        let mut warnings = Vec::new();

        progress.start(Stage::Search);
        let search_results = until_cancelled(cancel, async {
            self.search
                .search(query, config.search.top_k)
                .await
                .map_err(JobError::from)
        })
        .await?;
        if search_results.is_empty() {
            return Err(JobError::SearchUnavailable(
                "search returned no candidate documents".to_string(),
            ));
        }
        progress.complete(format!("{} results", search_results.len()));

        progress.start(Stage::Extract);
        let extraction = until_cancelled(
            cancel,
            self.extractor
                .extract(&search_results, &config.content, &config.retry),
        )
        .await?;
        let total = extraction.attempted();
        let failed = extraction.failures.len();
        if failed > 0 {
            warnings.push(JobWarning::PartialExtractionFailure { failed, total });
        }
        progress.complete(format!(
            "{} of {} documents extracted",
            extraction.documents.len(),
            total
        ));
        let documents = extraction.documents;

        progress.start(Stage::Collate);
        ensure_active(cancel)?;
        let blocks = collate(&documents, config.summarize.char_budget);
        info!(
            %job_id,
            "Collated {} documents into {} blocks",
            documents.len(),
            blocks.len()
        );
        progress.complete(format!("{} blocks", blocks.len()));

        progress.start(Stage::Summarize);
        let prompts = PromptBuilder::new(query, config.summarize.block_word_target);
        let summary_prompts = blocks
            .iter()
            .map(|block| prompts.build_prompt(block))
            .collect::<Result<Vec<SummaryPrompt>, JobError>>()?;
        let mapped = until_cancelled(
            cancel,
            self.summarizer
                .summarize_blocks(summary_prompts, &config.summarize, &config.retry),
        )
        .await?;
        let total = mapped.attempted();
        let failed = mapped.failures.len();
        if failed > 0 {
            warnings.push(JobWarning::PartialSummarizationFailure { failed, total });
        }
        progress.complete(format!(
            "{} of {} blocks summarized",
            mapped.summaries.len(),
            total
        ));

        progress.start(Stage::Reduce);
        let summary = until_cancelled(
            cancel,
            self.summarizer
                .reduce(&mapped.summaries, &prompts, &config.summarize, &config.retry),
        )
        .await?;
        progress.complete(format!("{} words", summary.word_count));

        Ok(ResearchReport {
            job_id,
            query: query.to_string(),
            summary,
            warnings,
            search_results,
            documents,
            blocks,
            block_summaries: mapped.summaries,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Await `stage` unless the job is cancelled first. Losing the race drops the
/// stage future, which aborts its in-flight worker tasks.
async fn until_cancelled<T, F>(cancel: &CancellationToken, stage: F) -> Result<T, JobError>
where
    F: Future<Output = Result<T, JobError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(JobError::Cancelled),
        result = stage => result,
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<(), JobError> {
    if cancel.is_cancelled() {
        return Err(JobError::Cancelled);
    }
    Ok(())
}

/// Tracks the open stage so a failure is reported against it
struct JobProgress<'a> {
    job_id: Uuid,
    sink: &'a dyn EventSink,
    current: Option<Stage>,
}

impl<'a> JobProgress<'a> {
    fn new(job_id: Uuid, sink: &'a dyn EventSink) -> Self {
        Self {
            job_id,
            sink,
            current: None,
        }
    }

    fn start(&mut self, stage: Stage) {
        self.current = Some(stage);
        self.sink.emit(self.job_id, ProcessingEvent::started(stage));
    }

    fn complete(&mut self, detail: String) {
        if let Some(stage) = self.current.take() {
            self.sink
                .emit(self.job_id, ProcessingEvent::completed(stage, detail));
        }
    }

    fn fail(&mut self, error: &JobError) {
        if let Some(stage) = self.current.take() {
            self.sink
                .emit(self.job_id, ProcessingEvent::failed(stage, error.to_string()));
        }
    }

    fn done(&mut self, elapsed_ms: u64) {
        self.sink.emit(
            self.job_id,
            ProcessingEvent::new(
                Stage::Done,
                EventStatus::Completed,
                Some(format!("finished in {}ms", elapsed_ms)),
            ),
        );
    }
}
