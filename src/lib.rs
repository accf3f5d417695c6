// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod collate;
pub mod config;
pub mod content;
pub mod pipeline;
pub mod progress;
pub mod search;
pub mod summarize;
pub mod version;

// Re-export main types
pub use collate::{collate, ContentBlock, ContentCollator};
pub use config::{ConfigError, PipelineConfig};
pub use content::{DocumentExtractor, DocumentFetcher, ExtractedDocument, HttpDocumentFetcher};
pub use pipeline::{JobError, JobWarning, ResearchPipeline, ResearchReport, RetryPolicy, WorkerPool};
pub use progress::{EventSink, EventStatus, ProcessingEvent, Stage};
pub use search::{SearchProvider, SearchResult, SearchService};
pub use summarize::{
    BlockSummary, CompletionProvider, FinalSummary, PromptBuilder, SummaryPrompt, Summarizer,
};
