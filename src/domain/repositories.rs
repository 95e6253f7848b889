//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::Serialize;

use super::DomainError;

/// One page of a listing, 1-based
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(per_page)
        };
        Self {
            items,
            page,
            per_page,
            total,
            total_pages,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Clamp a requested page number to the 1-based range used by listings
pub fn normalize_page(page: Option<u64>) -> u64 {
    page.unwrap_or(1).max(1)
}

/// Genre prediction row as exposed by the API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenrePrediction {
    pub id: i32,
    pub genre: String,
    pub confidence: String,
    pub file_name: String,
    pub created_at: String,
}

/// Book information row as exposed by the API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookInformation {
    pub id: i32,
    pub title: String,
    pub authors: String,
    pub categories: String,
    pub publisher: String,
    pub file_name: String,
    pub info_link: String,
    pub created_at: String,
}

/// Input for a genre prediction row
#[derive(Debug, Clone)]
pub struct NewGenrePrediction {
    pub genre: String,
    pub confidence: String,
    pub file_name: String,
}

/// Input for a book information row
#[derive(Debug, Clone)]
pub struct NewBookInformation {
    pub title: String,
    pub authors: String,
    pub categories: String,
    pub publisher: String,
    pub file_name: String,
    pub info_link: String,
}

/// Repository for confirmed cover predictions
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Store both rows of a confirmed upload atomically
    async fn record_confirmed(
        &self,
        genre: NewGenrePrediction,
        info: NewBookInformation,
    ) -> Result<(GenrePrediction, BookInformation), DomainError>;

    async fn genre_predictions_page(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<Page<GenrePrediction>, DomainError>;

    async fn book_information_page(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<Page<BookInformation>, DomainError>;

    async fn all_genre_predictions(&self) -> Result<Vec<GenrePrediction>, DomainError>;

    async fn all_book_information(&self) -> Result<Vec<BookInformation>, DomainError>;
}
