// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Research API endpoints
//!
//! `POST /v1/research` runs a job and answers with its summary.
//! `POST /v1/research/stream` relays the job's progress events over SSE.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{research_handler, research_stream_handler};
pub use request::ResearchRequest;
pub use response::ResearchResponse;
