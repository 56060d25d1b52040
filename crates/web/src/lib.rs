//! Web content acquisition for Sift.
//!
//! Discovers articles through a search API, fetches them, extracts a
//! bounded excerpt of headings and paragraphs, and joins the excerpts into
//! a corpus.

pub mod acquirer;
pub mod corpus;
pub mod extract;
pub mod fetch;
pub mod search;
pub mod types;

pub use acquirer::{Acquisition, ContentAcquirer, FetchOutcome};
pub use corpus::{build_corpus, corpus_entry};
pub use extract::extract_excerpt;
pub use fetch::{HttpFetcher, PageFetcher};
pub use search::{SearchClient, SerperClient, DEFAULT_SERPER_ENDPOINT};
pub use types::{ArticleExcerpt, ArticleLocation, MAX_EXCERPT_ITEMS};
