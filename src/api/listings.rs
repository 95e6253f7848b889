//! Read-only listings of the stored predictions

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::Deserialize;

use super::error::{JsonError, PageError};
use super::views;
use crate::domain::{normalize_page, BookInformation, GenrePrediction, Page};
use crate::infrastructure::session::Session;
use crate::infrastructure::AppState;

const MAX_PER_PAGE: u64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl PageQuery {
    fn per_page(&self, default: u64) -> u64 {
        self.per_page.unwrap_or(default).clamp(1, MAX_PER_PAGE)
    }
}

pub async fn show_all_genre_pred(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, PageError> {
    let page = state
        .predictions
        .genre_predictions_page(normalize_page(query.page), state.config.page_size)
        .await?;
    Ok(views::genre_predictions(&session.take_flashes(), &page))
}

pub async fn show_all_book_info(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, PageError> {
    let page = state
        .predictions
        .book_information_page(normalize_page(query.page), state.config.page_size)
        .await?;
    Ok(views::book_information(&session.take_flashes(), &page))
}

#[utoipa::path(
    get,
    path = "/api/genre-predictions",
    params(
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("per_page" = Option<u64>, Query, description = "Rows per page, at most 100")
    ),
    responses(
        (status = 200, description = "One page of genre predictions")
    )
)]
pub async fn list_genre_predictions(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<GenrePrediction>>, JsonError> {
    let page = state
        .predictions
        .genre_predictions_page(
            normalize_page(query.page),
            query.per_page(state.config.page_size),
        )
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/book-information",
    params(
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("per_page" = Option<u64>, Query, description = "Rows per page, at most 100")
    ),
    responses(
        (status = 200, description = "One page of book information")
    )
)]
pub async fn list_book_information(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<BookInformation>>, JsonError> {
    let page = state
        .predictions
        .book_information_page(
            normalize_page(query.page),
            query.per_page(state.config.page_size),
        )
        .await?;
    Ok(Json(page))
}
