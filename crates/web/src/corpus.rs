//! Corpus construction from article excerpts.

use crate::types::ArticleExcerpt;
use sift_core::{Corpus, CorpusEntry};

/// Join one excerpt into a corpus entry: headings, one space, paragraphs.
///
/// The separator is always present, so an excerpt without headings yields
/// an entry with a leading space.
pub fn corpus_entry(excerpt: &ArticleExcerpt) -> CorpusEntry {
    CorpusEntry::new(format!(
        "{} {}",
        excerpt.headings().join(" "),
        excerpt.paragraphs().join(" ")
    ))
}

/// One entry per excerpt, in the given order.
pub fn build_corpus(excerpts: &[ArticleExcerpt]) -> Corpus {
    Corpus::new(excerpts.iter().map(corpus_entry).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn excerpt(headings: &[&str], paragraphs: &[&str]) -> ArticleExcerpt {
        ArticleExcerpt::new(
            headings.iter().map(|s| s.to_string()).collect(),
            paragraphs.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_entry_format() {
        let entry = corpus_entry(&excerpt(&["France", "Capital"], &["Paris is the capital.", "Big."]));
        assert_eq!(entry.text(), "France Capital Paris is the capital. Big.");
    }

    #[test]
    fn test_no_headings_leaves_leading_space() {
        assert_eq!(corpus_entry(&excerpt(&[], &["Only text."])).text(), " Only text.");
        assert_eq!(corpus_entry(&excerpt(&["Title"], &[])).text(), "Title ");
        assert_eq!(corpus_entry(&ArticleExcerpt::default()).text(), " ");
    }

    #[test]
    fn test_build_corpus_is_deterministic() {
        let excerpts = vec![
            excerpt(&["A"], &["one", "two"]),
            excerpt(&[], &["three"]),
        ];

        let first = build_corpus(&excerpts);
        let second = build_corpus(&excerpts);

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.entries()[0].text(), "A one two");
        assert_eq!(first.entries()[1].text(), " three");
    }

    #[test]
    fn test_build_empty_corpus() {
        assert!(build_corpus(&[]).is_empty());
    }
}
