//! HTML text extraction.

use crate::types::ArticleExcerpt;
use scraper::{ElementRef, Html, Selector};
use sift_core::{AppError, AppResult};

const HEADING_SELECTOR: &str = "h1, h2, h3";
const PARAGRAPH_SELECTOR: &str = "p";

/// Extract headings and paragraphs from an HTML document.
///
/// Texts are collected in document order with whitespace runs collapsed
/// to one space; empty texts are dropped before truncation.
pub fn extract_excerpt(html: &str) -> AppResult<ArticleExcerpt> {
    let document = Html::parse_document(html);

    let headings = collect_texts(&document, HEADING_SELECTOR)?;
    let paragraphs = collect_texts(&document, PARAGRAPH_SELECTOR)?;

    Ok(ArticleExcerpt::new(headings, paragraphs))
}

fn collect_texts(document: &Html, selector: &str) -> AppResult<Vec<String>> {
    let selector = Selector::parse(selector)
        .map_err(|e| AppError::Other(format!("Invalid selector '{}': {:?}", selector, e)))?;

    Ok(document
        .select(&selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect())
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Trim and collapse internal whitespace runs to a single space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
