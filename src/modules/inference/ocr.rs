use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

use super::{build_client, CoverReader, CoverText, ImagePathRequest};
use crate::domain::DomainError;

/// OCR model served over HTTP
pub struct HttpCoverReader {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCoverReader {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl CoverReader for HttpCoverReader {
    async fn read_cover(&self, image_path: &Path) -> Result<CoverText, DomainError> {
        let path = image_path.to_string_lossy();

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&ImagePathRequest { image_path: &path })
            .send()
            .await
            .map_err(|e| DomainError::External(format!("OCR model unreachable: {}", e)))?;

        if !resp.status().is_success() {
            return Err(DomainError::External(format!(
                "OCR model returned status: {}",
                resp.status()
            )));
        }

        let text: CoverText = resp
            .json()
            .await
            .map_err(|e| DomainError::External(format!("Invalid OCR model response: {}", e)))?;

        tracing::info!(
            "OCR model read title '{}' / author '{}' from {}",
            text.pred_title,
            text.pred_author,
            path
        );
        Ok(text)
    }
}

/// Local OCR through the `tesseract` CLI
pub struct TesseractCoverReader {
    binary: String,
}

impl TesseractCoverReader {
    pub fn new() -> Self {
        Self {
            binary: "tesseract".to_string(),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for TesseractCoverReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoverReader for TesseractCoverReader {
    async fn read_cover(&self, image_path: &Path) -> Result<CoverText, DomainError> {
        // tesseract <image_path> stdout
        let output = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .output()
            .await
            .map_err(|e| DomainError::External(format!("Failed to execute tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::External(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        let text = guess_from_text(&raw);
        tracing::debug!(
            "Tesseract read {} bytes, guessed title '{}' / author '{}'",
            raw.len(),
            text.pred_title,
            text.pred_author
        );
        Ok(text)
    }
}

/// Split raw cover text into a title/author guess.
///
/// A line starting with "by " names the author; otherwise the last line does
/// when there are at least two. The title is the longest line left.
pub fn guess_from_text(raw: &str) -> CoverText {
    let mut lines: Vec<String> = raw
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| l.chars().any(char::is_alphanumeric))
        .collect();

    if lines.is_empty() {
        return CoverText::default();
    }

    let by_line = lines
        .iter()
        .position(|l| l.len() > 3 && l.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("by ")));

    let pred_author = match by_line {
        Some(idx) => lines.remove(idx)[3..].trim().to_string(),
        None if lines.len() >= 2 => lines.pop().unwrap_or_default(),
        None => String::new(),
    };

    let mut pred_title = String::new();
    for line in &lines {
        if line.chars().count() > pred_title.chars().count() {
            pred_title = line.clone();
        }
    }

    CoverText {
        pred_title,
        pred_author,
    }
}
