//! Static pages

use axum::response::Html;

use super::assets::EXAMPLE_COVER_PATH;
use super::views;
use crate::domain::GenrePrediction;
use crate::infrastructure::session::Session;
use crate::modules::integrations::BookDetails;

fn example_genre() -> GenrePrediction {
    GenrePrediction {
        id: 0,
        genre: "Business & Money".to_string(),
        confidence: "0.6679179".to_string(),
        file_name: "why_nations_fail.jpg".to_string(),
        created_at: String::new(),
    }
}

fn example_details() -> BookDetails {
    BookDetails {
        title: "Why Nations Fail".to_string(),
        authors: "Daron Acemoglu and James Robinson".to_string(),
        categories: "Economics".to_string(),
        publisher: "Crown Business".to_string(),
        info_link: "https://play.google.com/store/books/details?id=PLlOCUIAh88C&source=gbs_api"
            .to_string(),
    }
}

pub async fn home_page(session: Session) -> Html<String> {
    views::home(
        &session.take_flashes(),
        EXAMPLE_COVER_PATH,
        &example_genre(),
        &example_details(),
    )
}

pub async fn about_us(session: Session) -> Html<String> {
    views::about(&session.take_flashes())
}
