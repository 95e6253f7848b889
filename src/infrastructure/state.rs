//! Application state containing repositories, collaborators and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::config::{Config, OcrBackend};
use super::session::SessionStore;
use crate::domain::{DomainError, PredictionRepository};
use crate::infrastructure::SeaOrmPredictionRepository;
use crate::modules::inference::{
    CoverReader, GenreClassifier, HttpCoverReader, HttpGenreClassifier, TesseractCoverReader,
};
use crate::modules::integrations::{GoogleBooksClient, MetadataLookup};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    /// Confirmed predictions
    pub predictions: Arc<dyn PredictionRepository>,
    /// Cover image -> genre
    pub genre_model: Arc<dyn GenreClassifier>,
    /// Cover image -> title/author guess
    pub cover_reader: Arc<dyn CoverReader>,
    /// Title/author -> canonical book details
    pub metadata: Arc<dyn MetadataLookup>,
    pub sessions: SessionStore,
    pub config: Arc<Config>,
}

impl AppState {
    /// Create state from explicit collaborators
    pub fn new(
        db: DatabaseConnection,
        config: Config,
        genre_model: Arc<dyn GenreClassifier>,
        cover_reader: Arc<dyn CoverReader>,
        metadata: Arc<dyn MetadataLookup>,
    ) -> Self {
        let predictions = Arc::new(SeaOrmPredictionRepository::new(db.clone()));

        Self {
            db,
            predictions,
            genre_model,
            cover_reader,
            metadata,
            sessions: SessionStore::new(),
            config: Arc::new(config),
        }
    }

    /// Create state with the collaborators selected by the configuration
    pub fn from_config(db: DatabaseConnection, config: Config) -> Result<Self, DomainError> {
        let genre_model = Arc::new(HttpGenreClassifier::new(
            config.genre_model_url.clone(),
            config.inference_timeout,
        )?);

        let cover_reader: Arc<dyn CoverReader> = match config.ocr_backend {
            OcrBackend::Http => Arc::new(HttpCoverReader::new(
                config.ocr_model_url.clone(),
                config.inference_timeout,
            )?),
            OcrBackend::Tesseract => Arc::new(TesseractCoverReader::new()),
        };

        let metadata = Arc::new(GoogleBooksClient::new(
            config.google_books_url.clone(),
            config.google_books_api_key.clone(),
        )?);

        Ok(Self::new(db, config, genre_model, cover_reader, metadata))
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
