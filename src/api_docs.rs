use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::listings::list_genre_predictions,
        api::listings::list_book_information,
        api::export::export_data,
        api::export::export_genre_predictions_csv,
        api::export::export_book_information_csv,
    ),
    tags(
        (name = "coverlens", description = "CoverLens API")
    )
)]
pub struct ApiDoc;
