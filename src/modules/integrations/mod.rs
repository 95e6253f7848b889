//! Third-party book metadata

pub mod google_books;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

pub use google_books::GoogleBooksClient;

/// Placeholder for fields the metadata source does not provide
pub const UNKNOWN: &str = "Unknown";

/// Canonical details of a book, as shown for confirmation and persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDetails {
    pub title: String,
    pub authors: String,
    pub categories: String,
    pub publisher: String,
    pub info_link: String,
}

impl BookDetails {
    /// Details built from the search strings alone, used when no lookup succeeds
    pub fn from_guess(title: &str, author: &str) -> Self {
        let or_unknown = |s: &str| {
            let s = s.trim();
            if s.is_empty() {
                UNKNOWN.to_string()
            } else {
                s.to_string()
            }
        };

        Self {
            title: or_unknown(title),
            authors: or_unknown(author),
            categories: UNKNOWN.to_string(),
            publisher: UNKNOWN.to_string(),
            info_link: UNKNOWN.to_string(),
        }
    }
}

#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Resolve a title/author pair to the best matching book
    async fn lookup(&self, title: &str, author: &str) -> Result<BookDetails, DomainError>;
}
