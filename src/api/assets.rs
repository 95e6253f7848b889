//! Assets compiled into the binary
//!
//! Served apart from `/static`, which only holds uploaded covers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub const EXAMPLE_COVER_PATH: &str = "/assets/example_cover.svg";

const EXAMPLE_COVER_SVG: &str = include_str!("../../assets/example_cover.svg");

/// GET /assets/example_cover.svg
///
/// Cover shown with the worked example on the home page
pub async fn example_cover() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "image/svg+xml"),
            ("cache-control", "public, max-age=86400"),
        ],
        EXAMPLE_COVER_SVG,
    )
        .into_response()
}
