// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Narrative text extraction
//!
//! Keeps the page title plus headings and paragraphs. Text under scripts,
//! styles, navigation, footers, sidebars and forms is discarded. When the page
//! has a recognisable main-content container (`<article>`, `<main>`, ...) with
//! enough text, only that container is read.

use scraper::{ElementRef, Html, Selector};

/// Containers tried in order before falling back to the whole document
const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".story-body",
    ".article__body",
    ".content-body",
    "#article-body",
    "#content",
];

const NARRATIVE_SELECTOR: &str = "h1, h2, h3, p";

/// Ancestors whose text never counts as narrative
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "footer", "aside", "form",
];

/// A container is used only when it holds at least this many characters
const MIN_CONTAINER_CHARS: usize = 200;

/// Title and narrative paragraphs of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pub title: Option<String>,
    pub paragraphs: Vec<String>,
}

impl ExtractedText {
    /// Render the text handed to collation, or `None` when there is no body text.
    ///
    /// The title heads the document and a blank line closes it, so documents
    /// stay visually separated once packed next to each other.
    pub fn render(&self) -> Option<String> {
        if self.paragraphs.is_empty() {
            return None;
        }
        let body = self.paragraphs.join("\n");
        Some(match &self.title {
            Some(title) => format!("{}\n\n{}\n\n", title, body),
            None => format!("{}\n\n", body),
        })
    }
}

/// Extract narrative text from a fetched body according to its content type.
///
/// `content_type` of `None` is treated as HTML.
pub fn extract_document_text(body: &str, content_type: Option<&str>) -> ExtractedText {
    match content_type.map(media_type) {
        Some(ref media) if media == "text/plain" => extract_plain_text(body),
        _ => extract_html_text(body),
    }
}

/// Whether a `Content-Type` value names a textual format we can extract
pub fn is_text_content_type(content_type: &str) -> bool {
    matches!(
        media_type(content_type).as_str(),
        "text/html" | "application/xhtml+xml" | "text/plain"
    )
}

fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Extract title and narrative paragraphs from HTML
pub fn extract_html_text(html: &str) -> ExtractedText {
    let document = Html::parse_document(html);

    let title = Selector::parse("title").ok().and_then(|selector| {
        document
            .select(&selector)
            .next()
            .map(|el| clean_text(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    });

    let Ok(narrative) = Selector::parse(NARRATIVE_SELECTOR) else {
        return ExtractedText {
            title,
            paragraphs: Vec::new(),
        };
    };

    for selector_str in MAIN_CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(container) = document.select(&selector).next() {
            let paragraphs = narrative_blocks(container, &narrative);
            let chars: usize = paragraphs.iter().map(|p| p.chars().count()).sum();
            if chars >= MIN_CONTAINER_CHARS {
                return ExtractedText { title, paragraphs };
            }
        }
    }

    ExtractedText {
        title,
        paragraphs: narrative_blocks(document.root_element(), &narrative),
    }
}

/// Split plain text into paragraphs on blank lines
pub fn extract_plain_text(text: &str) -> ExtractedText {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            push_paragraph(&mut paragraphs, &current);
            current.clear();
        } else {
            current.push_str(line);
            current.push(' ');
        }
    }
    push_paragraph(&mut paragraphs, &current);

    ExtractedText {
        title: None,
        paragraphs,
    }
}

fn push_paragraph(paragraphs: &mut Vec<String>, raw: &str) {
    let cleaned = clean_text(raw);
    if !cleaned.is_empty() {
        paragraphs.push(cleaned);
    }
}

fn narrative_blocks(scope: ElementRef, narrative: &Selector) -> Vec<String> {
    scope
        .select(narrative)
        .filter(|el| !has_skipped_ancestor(el))
        .map(|el| clean_text(&visible_text(el)))
        .filter(|text| !text.is_empty())
        .collect()
}

fn has_skipped_ancestor(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| SKIPPED_TAGS.contains(&a.value().name()))
}

/// Text of an element, leaving out nested script/style content
fn visible_text(element: ElementRef) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take_while(|a| a.id() != element.id())
            .any(|a| SKIPPED_TAGS.contains(&a.value().name()));
        if !hidden {
            out.push_str(text);
        }
    }
    out
}

/// Normalize whitespace runs to single spaces
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
