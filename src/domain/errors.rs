//! Errors shared by the workflow, the collaborators and the store
//!
//! Kept free of axum types; `api::error` decides the HTTP rendering.

use std::fmt;

#[derive(Debug)]
pub enum DomainError {
    /// No book matched a lookup, or a row does not exist
    NotFound,
    /// Input rejected before any work was done
    Validation(String),
    Database(String),
    /// Model service, OCR or metadata API failure
    External(String),
    /// Filesystem and other local failures
    Internal(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound => f.write_str("Nothing matched"),
            DomainError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            DomainError::Database(msg) => write!(f, "Storage failure: {}", msg),
            DomainError::External(msg) => write!(f, "Upstream service failed: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal failure: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}
