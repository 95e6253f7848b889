//! Cover upload: validation, storage, inference, staging

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use image::ImageFormat;
use unicode_normalization::UnicodeNormalization;

use super::error::PageError;
use super::views;
use crate::domain::DomainError;
use crate::infrastructure::session::{FlashKind, Session, StagedUpload};
use crate::infrastructure::AppState;

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

pub const NO_FILE_PART: &str = "No file part";
pub const NO_SELECTED_FILE: &str = "No selected file";
pub const INVALID_FILE: &str = "Not a Valid File, must be a png, jpg or jpeg";

const UPLOAD_PAGE: &str = "/uploadImage";

fn too_large_message(limit: usize) -> String {
    format!(
        "File is too large, the limit is {:.1} MB",
        limit as f64 / (1024.0 * 1024.0)
    )
}

/// Flash message for a multipart read failure
fn read_failure_message(e: &MultipartError, limit: usize) -> String {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large_message(limit)
    } else {
        NO_FILE_PART.to_string()
    }
}

/// Unique stored name keeping the upload's extension
fn generated_name(raw_name: &str) -> String {
    let ext = extension(raw_name).unwrap_or_else(|| "png".to_string());
    format!("cover-{}.{}", uuid::Uuid::new_v4().simple(), ext)
}

/// Lower-cased extension, if the name has one
fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

pub fn allowed_file(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Reduce a client-supplied file name to a safe ASCII name
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename.nfkd().filter(char::is_ascii).collect();
    let ascii = ascii.replace(['/', '\\'], " ");
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// PNG or JPEG by magic bytes
pub fn is_supported_image(data: &[u8]) -> bool {
    matches!(
        image::guess_format(data),
        Ok(ImageFormat::Png) | Ok(ImageFormat::Jpeg)
    )
}

fn reject(session: &Session, message: &str) -> Response {
    session.flash(FlashKind::Error, message);
    Redirect::to(UPLOAD_PAGE).into_response()
}

pub async fn upload_form(session: Session) -> Html<String> {
    views::upload_form(&session.take_flashes())
}

pub async fn upload_cover(
    State(state): State<AppState>,
    session: Session,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, PageError> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(e) => {
            tracing::warn!("Upload is not multipart: {}", e);
            return Ok(reject(&session, NO_FILE_PART));
        }
    };

    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let filename = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(data) => upload = Some((filename, data)),
                    Err(e) => {
                        tracing::warn!("Failed to read uploaded file: {}", e);
                        let message = read_failure_message(&e, state.config.max_upload_bytes);
                        return Ok(reject(&session, &message));
                    }
                }
                break;
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Malformed multipart upload: {}", e);
                let message = read_failure_message(&e, state.config.max_upload_bytes);
                return Ok(reject(&session, &message));
            }
        }
    }

    let Some((raw_name, data)) = upload else {
        return Ok(reject(&session, NO_FILE_PART));
    };
    if raw_name.trim().is_empty() {
        return Ok(reject(&session, NO_SELECTED_FILE));
    }
    if !allowed_file(&raw_name) || !is_supported_image(&data) {
        tracing::info!("Rejected upload '{}' ({} bytes)", raw_name, data.len());
        return Ok(reject(&session, INVALID_FILE));
    }

    let mut file_name = secure_filename(&raw_name);
    if !allowed_file(&file_name) {
        // Nothing usable survived sanitizing, e.g. a non-Latin name
        file_name = generated_name(&raw_name);
    } else if state.sessions.is_staged_elsewhere(&file_name, session.id()) {
        // Another session still has to confirm the cover under this name
        file_name = generated_name(&raw_name);
    }

    let upload_dir = &state.config.upload_dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(DomainError::from)?;
    let path = upload_dir.join(&file_name);
    let replaced = tokio::fs::try_exists(&path).await.unwrap_or(true);
    tokio::fs::write(&path, &data)
        .await
        .map_err(DomainError::from)?;
    tracing::info!("Stored cover {} ({} bytes)", path.display(), data.len());

    let (genre, cover) = tokio::join!(
        state.genre_model.predict_genre(&path),
        state.cover_reader.read_cover(&path)
    );

    let (genre, cover) = match (genre, cover) {
        (Ok(genre), Ok(cover)) => (genre, cover),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Inference failed for {}: {}", file_name, e);
            if !replaced && let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!("Failed to remove {}: {}", path.display(), e);
            }
            return Ok(reject(
                &session,
                &format!("Could not analyse the cover: {}", e),
            ));
        }
    };

    tracing::debug!(
        "Staged {} for session {}: {} ({}), '{}' by '{}'",
        file_name,
        session.id(),
        genre.genre,
        genre.confidence_text(),
        cover.pred_title,
        cover.pred_author
    );
    session.stage_upload(StagedUpload {
        file_name,
        genre,
        cover,
    });

    Ok(Redirect::to("/checkbookDetails").into_response())
}
