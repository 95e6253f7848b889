use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use super::error::JsonError;
use crate::domain::{BookInformation, DomainError, GenrePrediction};
use crate::infrastructure::AppState;

#[derive(Serialize)]
pub struct BackupData {
    pub version: String,
    pub timestamp: String,
    pub genre_predictions: Vec<GenrePrediction>,
    pub book_information: Vec<BookInformation>,
}

fn attachment_headers(content_type: &'static str, filename: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    if let Ok(disposition) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
    {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }
    headers
}

/// Column order of the serialized `GenrePrediction`
const GENRE_PREDICTION_COLUMNS: [&str; 5] = ["id", "genre", "confidence", "file_name", "created_at"];

/// Column order of the serialized `BookInformation`
const BOOK_INFORMATION_COLUMNS: [&str; 8] = [
    "id",
    "title",
    "authors",
    "categories",
    "publisher",
    "file_name",
    "info_link",
    "created_at",
];

/// Header row first, even when there are no rows
fn to_csv<T: Serialize>(columns: &[&str], rows: &[T]) -> Result<Vec<u8>, DomainError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(columns)
        .map_err(|e| DomainError::Internal(format!("CSV encoding failed: {}", e)))?;
    for row in rows {
        wtr.serialize(row)
            .map_err(|e| DomainError::Internal(format!("CSV encoding failed: {}", e)))?;
    }
    wtr.into_inner()
        .map_err(|e| DomainError::Internal(format!("CSV encoding failed: {}", e)))
}

#[utoipa::path(
    get,
    path = "/api/export",
    responses(
        (status = 200, description = "JSON backup of both tables")
    )
)]
pub async fn export_data(State(state): State<AppState>) -> Result<impl IntoResponse, JsonError> {
    let backup = BackupData {
        version: "1.0".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        genre_predictions: state.predictions.all_genre_predictions().await?,
        book_information: state.predictions.all_book_information().await?,
    };

    let filename = format!(
        "coverlens_backup_{}.json",
        chrono::Utc::now().format("%Y-%m-%d")
    );

    Ok((attachment_headers("application/json", &filename), Json(backup)))
}

#[utoipa::path(
    get,
    path = "/api/export/genre_predictions.csv",
    responses(
        (status = 200, description = "Genre predictions as CSV")
    )
)]
pub async fn export_genre_predictions_csv(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, JsonError> {
    let rows = state.predictions.all_genre_predictions().await?;
    let body = to_csv(&GENRE_PREDICTION_COLUMNS, &rows)?;
    Ok((
        attachment_headers("text/csv", "genre_predictions.csv"),
        body,
    ))
}

#[utoipa::path(
    get,
    path = "/api/export/book_information.csv",
    responses(
        (status = 200, description = "Book information as CSV")
    )
)]
pub async fn export_book_information_csv(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, JsonError> {
    let rows = state.predictions.all_book_information().await?;
    let body = to_csv(&BOOK_INFORMATION_COLUMNS, &rows)?;
    Ok((
        attachment_headers("text/csv", "book_information.csv"),
        body,
    ))
}
