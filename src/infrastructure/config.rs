use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Which OCR implementation reads the cover text
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OcrBackend {
    /// OCR model exposed over HTTP
    Http,
    /// Local `tesseract` CLI
    Tesseract,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub genre_model_url: String,
    pub ocr_backend: OcrBackend,
    pub ocr_model_url: String,
    pub google_books_url: String,
    pub google_books_api_key: Option<String>,
    pub inference_timeout: Duration,
    pub page_size: u64,
    pub max_upload_bytes: usize,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let ocr_backend = match lookup("OCR_BACKEND").as_deref().map(str::trim) {
            None | Some("") | Some("http") => OcrBackend::Http,
            Some("tesseract") => OcrBackend::Tesseract,
            Some(other) => {
                tracing::warn!("Unknown OCR_BACKEND '{}', falling back to http", other);
                OcrBackend::Http
            }
        };

        Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://BooksPredictions.sqlite3?mode=rwc".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./static")),
            genre_model_url: lookup("GENRE_MODEL_URL")
                .unwrap_or_else(|| "http://127.0.0.1:8501/predict".to_string()),
            ocr_backend,
            ocr_model_url: lookup("OCR_MODEL_URL")
                .unwrap_or_else(|| "http://127.0.0.1:8502/ocr".to_string()),
            google_books_url: lookup("GOOGLE_BOOKS_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "https://www.googleapis.com/books/v1".to_string()),
            google_books_api_key: lookup("GOOGLE_BOOKS_API_KEY").filter(|k| !k.trim().is_empty()),
            inference_timeout: Duration::from_secs(
                lookup("INFERENCE_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            page_size: lookup("PAGE_SIZE")
                .and_then(|s| s.parse().ok())
                .filter(|&n: &u64| n > 0)
                .unwrap_or(20),
            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(Vec::new),
        }
    }
}
