// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document extraction
//!
//! Fetches every search result and keeps the narrative text of the pages that
//! could be read.
//!
//! ```text
//! SearchResult (URLs) → DocumentFetcher → HTML → extractor → ExtractedDocument
//!                      (bounded worker pool, per-page timeout, join)
//! ```

pub mod config;
pub mod documents;
pub mod extractor;
pub mod fetcher;

pub use config::ContentFetchConfig;
pub use documents::{DocumentExtractor, ExtractedDocument, ExtractionFailure, ExtractionOutcome};
pub use extractor::{extract_document_text, ExtractedText};
pub use fetcher::{DocumentFetcher, FetchError, HttpDocumentFetcher, RawDocument};
