// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Research job orchestration
//!
//! A job runs its stages strictly in order:
//! search → extract → collate → summarize (map) → reduce.
//! Extraction and block summarization fan out to a bounded [`pool::WorkerPool`]
//! and join before the next stage starts.

pub mod error;
pub mod job;
pub mod pool;
pub mod retry;

pub use error::{JobError, JobWarning};
pub use job::{ResearchPipeline, ResearchReport};
pub use pool::WorkerPool;
pub use retry::{RetryPolicy, Retryable};
