//! Confirmation and correction of a staged upload

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use super::error::PageError;
use super::views;
use crate::domain::{DomainError, NewBookInformation, NewGenrePrediction};
use crate::infrastructure::session::{FlashKind, Session, StagedUpload};
use crate::infrastructure::AppState;
use crate::modules::integrations::BookDetails;

pub const NO_STAGED_UPLOAD: &str = "Upload a book cover first";
pub const EMPTY_CORRECTION: &str = "Enter a title or an author";

#[derive(Debug, Deserialize)]
pub struct ConfirmForm {
    pub confirm_details_button: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CorrectionForm {
    #[serde(default)]
    pub updatedbooktitle: String,
    #[serde(default)]
    pub updatedbookauthor: String,
}

fn require_upload(session: &Session) -> Result<StagedUpload, Response> {
    session.staged_upload().ok_or_else(|| {
        session.flash(FlashKind::Error, NO_STAGED_UPLOAD);
        Redirect::to("/uploadImage").into_response()
    })
}

/// Look the book up, falling back to the search strings when nothing resolves
async fn resolve_details(state: &AppState, session: &Session, title: &str, author: &str) -> BookDetails {
    match state.metadata.lookup(title, author).await {
        Ok(details) => details,
        Err(DomainError::NotFound) => {
            session.flash(
                FlashKind::Warning,
                "No match found on Google Books, showing the text read from the cover",
            );
            BookDetails::from_guess(title, author)
        }
        Err(DomainError::Validation(_)) => {
            session.flash(
                FlashKind::Warning,
                "No title or author could be read from the cover",
            );
            BookDetails::from_guess(title, author)
        }
        Err(e) => {
            tracing::warn!("Metadata lookup failed for '{}' / '{}': {}", title, author, e);
            session.flash(
                FlashKind::Warning,
                format!("Google Books lookup failed: {}", e),
            );
            BookDetails::from_guess(title, author)
        }
    }
}

async fn persist(
    state: &AppState,
    session: &Session,
    upload: &StagedUpload,
    details: BookDetails,
) -> Result<(), DomainError> {
    let genre = NewGenrePrediction {
        genre: upload.genre.genre.clone(),
        confidence: upload.genre.confidence_text(),
        file_name: upload.file_name.clone(),
    };
    let info = NewBookInformation {
        title: details.title,
        authors: details.authors,
        categories: details.categories,
        publisher: details.publisher,
        file_name: upload.file_name.clone(),
        info_link: details.info_link,
    };

    let (_, saved) = state.predictions.record_confirmed(genre, info).await?;

    session.clear_upload();
    session.flash(FlashKind::Success, format!("Saved \"{}\"", saved.title));
    Ok(())
}

pub async fn check_details_page(
    State(state): State<AppState>,
    session: Session,
) -> Response {
    let upload = match require_upload(&session) {
        Ok(upload) => upload,
        Err(redirect) => return redirect,
    };

    let details = resolve_details(
        &state,
        &session,
        &upload.cover.pred_title,
        &upload.cover.pred_author,
    )
    .await;

    views::check_details(&session.take_flashes(), &upload, &details).into_response()
}

pub async fn confirm_details(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ConfirmForm>,
) -> Result<Response, PageError> {
    let upload = match require_upload(&session) {
        Ok(upload) => upload,
        Err(redirect) => return Ok(redirect),
    };

    match form.confirm_details_button.as_deref() {
        Some("No") => return Ok(Redirect::to("/editbookDetails").into_response()),
        Some("Yes") => {}
        _ => return Ok(check_details_page(State(state), session).await),
    }

    let details = resolve_details(
        &state,
        &session,
        &upload.cover.pred_title,
        &upload.cover.pred_author,
    )
    .await;
    persist(&state, &session, &upload, details).await?;

    Ok(Redirect::to("/uploadImage").into_response())
}

pub async fn edit_details_page(session: Session) -> Response {
    match require_upload(&session) {
        Ok(upload) => views::edit_details(&session.take_flashes(), &upload).into_response(),
        Err(redirect) => redirect,
    }
}

pub async fn correct_details(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CorrectionForm>,
) -> Result<Response, PageError> {
    let upload = match require_upload(&session) {
        Ok(upload) => upload,
        Err(redirect) => return Ok(redirect),
    };

    let title = form.updatedbooktitle.trim();
    let author = form.updatedbookauthor.trim();
    if title.is_empty() && author.is_empty() {
        session.flash(FlashKind::Error, EMPTY_CORRECTION);
        return Ok(views::edit_details(&session.take_flashes(), &upload).into_response());
    }

    tracing::info!(
        "User corrected '{}' / '{}' to '{}' / '{}'",
        upload.cover.pred_title,
        upload.cover.pred_author,
        title,
        author
    );

    let details = resolve_details(&state, &session, title, author).await;
    persist(&state, &session, &upload, details).await?;

    Ok(Redirect::to("/uploadImage").into_response())
}
