// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Content collation
//!
//! Packs extracted documents, in order, into blocks of at most `budget`
//! characters. Documents are never split: a document longer than the budget
//! becomes a block of its own.

use serde::Serialize;

use crate::content::ExtractedDocument;

/// One unit of map-phase summarization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    /// Zero-based position in the job's block sequence
    pub sequence: usize,
    pub text: String,
    /// Length of `text` in characters
    pub char_count: usize,
}

impl ContentBlock {
    /// Whether the block exceeds `budget`, which only a single oversized document can cause
    pub fn is_overflow(&self, budget: usize) -> bool {
        self.char_count > budget
    }
}

/// Greedily pack `documents` into blocks bounded by `budget` characters.
///
/// Concatenating the returned block texts yields exactly the concatenated
/// document texts.
pub fn collate(documents: &[ExtractedDocument], budget: usize) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut text = String::new();
    let mut chars = 0usize;

    for document in documents {
        let doc_chars = document.text.chars().count();
        if chars + doc_chars > budget && !text.is_empty() {
            blocks.push(ContentBlock {
                sequence: blocks.len(),
                text: std::mem::take(&mut text),
                char_count: chars,
            });
            chars = 0;
        }
        text.push_str(&document.text);
        chars += doc_chars;
    }

    if !text.is_empty() {
        blocks.push(ContentBlock {
            sequence: blocks.len(),
            text,
            char_count: chars,
        });
    }

    blocks
}

/// Collator bound to a fixed character budget
#[derive(Debug, Clone, Copy)]
pub struct ContentCollator {
    budget: usize,
}

impl ContentCollator {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn collate(&self, documents: &[ExtractedDocument]) -> Vec<ContentBlock> {
        collate(documents, self.budget)
    }
}
