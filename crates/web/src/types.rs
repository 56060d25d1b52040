//! Article types produced by search and fetch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of headings and of paragraphs kept per article.
pub const MAX_EXCERPT_ITEMS: usize = 5;

/// URL of an article discovered by search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleLocation(String);

impl ArticleLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bounded text extracted from one article, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleExcerpt {
    headings: Vec<String>,
    paragraphs: Vec<String>,
}

impl ArticleExcerpt {
    /// Build an excerpt, keeping only the first [`MAX_EXCERPT_ITEMS`] of
    /// each list.
    pub fn new(mut headings: Vec<String>, mut paragraphs: Vec<String>) -> Self {
        headings.truncate(MAX_EXCERPT_ITEMS);
        paragraphs.truncate(MAX_EXCERPT_ITEMS);
        Self {
            headings,
            paragraphs,
        }
    }

    pub fn headings(&self) -> &[String] {
        &self.headings
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty() && self.paragraphs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates_each_list() {
        let headings = (0..8).map(|i| format!("h{}", i)).collect();
        let paragraphs = (0..2).map(|i| format!("p{}", i)).collect();

        let excerpt = ArticleExcerpt::new(headings, paragraphs);
        assert_eq!(excerpt.headings(), ["h0", "h1", "h2", "h3", "h4"]);
        assert_eq!(excerpt.paragraphs(), ["p0", "p1"]);
    }

    #[test]
    fn test_empty_excerpt() {
        assert!(ArticleExcerpt::default().is_empty());
        assert!(!ArticleExcerpt::new(vec![], vec!["x".to_string()]).is_empty());
    }
}
