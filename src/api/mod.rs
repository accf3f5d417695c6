// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod http_server;
pub mod research;

pub use errors::{ApiError, ApiErrorResponse, ErrorResponse};
pub use http_server::{create_router, start_server, AppState, HealthResponse};
pub use research::{research_handler, research_stream_handler, ResearchRequest, ResearchResponse};
