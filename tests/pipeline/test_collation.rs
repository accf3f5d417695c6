// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Collation invariants over many document shapes

use fabstir_web_researcher::collate::{collate, ContentCollator};
use fabstir_web_researcher::content::ExtractedDocument;
use url::Url;

/// Deterministic pseudo-random lengths (xorshift)
fn lengths(seed: u64, count: usize, max: usize) -> Vec<usize> {
    let mut state = seed.max(1);
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % max as u64) as usize + 1
        })
        .collect()
}

fn documents(lengths: &[usize]) -> Vec<ExtractedDocument> {
    lengths
        .iter()
        .enumerate()
        .map(|(i, len)| ExtractedDocument {
            location: Url::parse(&format!("https://doc{}.example/", i)).unwrap(),
            text: format!("{:0>width$}", i, width = *len),
        })
        .collect()
}

#[test]
fn test_blocks_respect_budget_unless_single_document() {
    for seed in 1..=25u64 {
        let lens = lengths(seed, 30, 5_000);
        let docs = documents(&lens);
        for budget in [1, 100, 1_000, 4_000, 14_000, 50_000] {
            let blocks = collate(&docs, budget);
            for block in &blocks {
                assert_eq!(block.char_count, block.text.chars().count());
                if block.char_count > budget {
                    assert!(
                        docs.iter().any(|d| d.text == block.text),
                        "overflow block must be exactly one document (seed {}, budget {})",
                        seed,
                        budget
                    );
                }
            }
        }
    }
}

#[test]
fn test_concatenation_is_preserved() {
    for seed in 1..=25u64 {
        let docs = documents(&lengths(seed, 20, 3_000));
        let expected: String = docs.iter().map(|d| d.text.as_str()).collect();
        for budget in [1, 500, 2_999, 14_000] {
            let rebuilt: String = collate(&docs, budget)
                .iter()
                .map(|b| b.text.as_str())
                .collect();
            assert_eq!(rebuilt, expected);
        }
    }
}

#[test]
fn test_sequences_are_dense_and_ordered() {
    let docs = documents(&lengths(7, 40, 2_000));
    let blocks = ContentCollator::new(3_000).collate(&docs);
    for (i, block) in blocks.iter().enumerate() {
        assert_eq!(block.sequence, i);
    }
}

#[test]
fn test_budget_one_gives_one_block_per_document() {
    let docs = documents(&[3, 1, 4, 1, 5]);
    let blocks = collate(&docs, 1);
    assert_eq!(blocks.len(), docs.len());
}
