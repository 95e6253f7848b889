use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use super::{build_client, GenreClassifier, GenreGuess, ImagePathRequest};
use crate::domain::DomainError;

/// Genre classifier served over HTTP
pub struct HttpGenreClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpGenreClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl GenreClassifier for HttpGenreClassifier {
    async fn predict_genre(&self, image_path: &Path) -> Result<GenreGuess, DomainError> {
        let path = image_path.to_string_lossy();
        tracing::debug!("Requesting genre prediction for {}", path);

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&ImagePathRequest { image_path: &path })
            .send()
            .await
            .map_err(|e| DomainError::External(format!("Genre model unreachable: {}", e)))?;

        if !resp.status().is_success() {
            return Err(DomainError::External(format!(
                "Genre model returned status: {}",
                resp.status()
            )));
        }

        let guess: GenreGuess = resp
            .json()
            .await
            .map_err(|e| DomainError::External(format!("Invalid genre model response: {}", e)))?;

        if guess.genre.trim().is_empty() {
            return Err(DomainError::External(
                "Genre model returned an empty label".to_string(),
            ));
        }

        tracing::info!(
            "Genre model predicted '{}' ({}) for {}",
            guess.genre,
            guess.confidence,
            path
        );
        Ok(guess)
    }
}
