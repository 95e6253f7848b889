pub mod assets;
pub mod error;
pub mod export;
pub mod health;
pub mod listings;
pub mod pages;
pub mod review;
pub mod upload;
pub mod views;

use axum::{routing::get, Router};

use crate::infrastructure::AppState;

/// HTML pages of the upload/confirm/correct workflow
pub fn web_router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home_page))
        .route("/about_us", get(pages::about_us))
        // Upload and review
        .route(
            "/uploadImage",
            get(upload::upload_form).post(upload::upload_cover),
        )
        .route(
            "/checkbookDetails",
            get(review::check_details_page).post(review::confirm_details),
        )
        .route(
            "/editbookDetails",
            get(review::edit_details_page).post(review::correct_details),
        )
        // Listings
        .route("/show_all_genre_pred", get(listings::show_all_genre_pred))
        .route("/show_all_book_info", get(listings::show_all_book_info))
}

/// Embedded assets, served without a session
pub fn assets_router() -> Router<AppState> {
    Router::new().route(assets::EXAMPLE_COVER_PATH, get(assets::example_cover))
}

/// JSON API, nested under `/api`
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/genre-predictions", get(listings::list_genre_predictions))
        .route("/book-information", get(listings::list_book_information))
        // Export
        .route("/export", get(export::export_data))
        .route(
            "/export/genre_predictions.csv",
            get(export::export_genre_predictions_csv),
        )
        .route(
            "/export/book_information.csv",
            get(export::export_book_information_csv),
        )
}
