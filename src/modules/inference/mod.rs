//! Inference collaborators
//!
//! The genre classifier and the OCR model are opaque: both take the path of a
//! stored cover image and return their best guess.

pub mod genre;
pub mod ocr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::DomainError;

pub use genre::HttpGenreClassifier;
pub use ocr::{HttpCoverReader, TesseractCoverReader};

/// Genre label predicted for a cover
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreGuess {
    pub genre: String,
    pub confidence: f32,
}

impl GenreGuess {
    /// Confidence as persisted, e.g. `0.6679179`
    pub fn confidence_text(&self) -> String {
        self.confidence.to_string()
    }
}

/// Title and author read off a cover
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverText {
    #[serde(rename = "predTitle", default)]
    pub pred_title: String,
    #[serde(rename = "predAuthor", default)]
    pub pred_author: String,
}

#[async_trait]
pub trait GenreClassifier: Send + Sync {
    async fn predict_genre(&self, image_path: &Path) -> Result<GenreGuess, DomainError>;
}

#[async_trait]
pub trait CoverReader: Send + Sync {
    async fn read_cover(&self, image_path: &Path) -> Result<CoverText, DomainError>;
}

/// Request body shared by both model services
#[derive(Debug, Serialize)]
pub(crate) struct ImagePathRequest<'a> {
    pub image_path: &'a str,
}

pub(crate) fn build_client(timeout: std::time::Duration) -> Result<reqwest::Client, DomainError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DomainError::Internal(format!("Failed to create HTTP client: {}", e)))
}
