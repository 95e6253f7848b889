//! Mapping of domain errors onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::views;
use crate::domain::DomainError;

pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::NotFound => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::External(_) => StatusCode::BAD_GATEWAY,
        DomainError::Database(_) | DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error rendered as an HTML page
#[derive(Debug)]
pub struct PageError(pub DomainError);

impl From<DomainError> for PageError {
    fn from(e: DomainError) -> Self {
        PageError(e)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        tracing::error!("Request failed ({}): {}", status, self.0);
        (status, views::error_page(&self.0.to_string())).into_response()
    }
}

/// Error rendered as `{"error": ...}`
#[derive(Debug)]
pub struct JsonError(pub DomainError);

impl From<DomainError> for JsonError {
    fn from(e: DomainError) -> Self {
        JsonError(e)
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        tracing::error!("API request failed ({}): {}", status, self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
