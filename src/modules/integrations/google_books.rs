//! Google Books volume search
//!
//! Resolves an OCR guess (title/author) to the canonical record of the best
//! matching volume.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use strsim::jaro_winkler;
use unicode_normalization::UnicodeNormalization;

use super::{BookDetails, MetadataLookup, UNKNOWN};
use crate::domain::DomainError;

const CACHE_TTL: Duration = Duration::from_secs(3600); // 1 hour
const MAX_CACHE_ENTRIES: usize = 100;
const MAX_RESULTS: u32 = 10;

struct CacheEntry {
    data: BookDetails,
    created_at: Instant,
}

#[derive(Debug, Deserialize)]
struct GoogleBooksResponse {
    items: Option<Vec<GoogleBookItem>>,
}

#[derive(Debug, Deserialize)]
struct GoogleBookItem {
    #[serde(rename = "volumeInfo")]
    volume_info: GoogleVolumeInfo,
}

#[derive(Debug, Clone, Deserialize)]
struct GoogleVolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    categories: Option<Vec<String>>,
    publisher: Option<String>,
    #[serde(rename = "infoLink")]
    info_link: Option<String>,
}

pub struct GoogleBooksClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl GoogleBooksClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DomainError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn volumes_url(&self, title: &str, author: &str) -> String {
        let mut terms = Vec::new();
        if !title.is_empty() {
            terms.push(format!("intitle:{}", urlencoding::encode(title)));
        }
        if !author.is_empty() {
            terms.push(format!("inauthor:{}", urlencoding::encode(author)));
        }

        let mut url = format!(
            "{}/volumes?q={}&maxResults={}",
            self.base_url,
            terms.join("+"),
            MAX_RESULTS
        );
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(&urlencoding::encode(key));
        }
        url
    }

    async fn search(&self, title: &str, author: &str) -> Result<Vec<GoogleVolumeInfo>, DomainError> {
        let url = self.volumes_url(title, author);
        tracing::debug!("Google Books query: intitle='{}' inauthor='{}'", title, author);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::External(format!("Failed to send request: {}", e)))?;

        if !resp.status().is_success() {
            return Err(DomainError::External(format!(
                "Google Books API returned status: {}",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| DomainError::External(format!("Failed to read response body: {}", e)))?;

        let parsed: GoogleBooksResponse = serde_json::from_str(&body)
            .map_err(|e| DomainError::External(format!("Failed to parse JSON: {}", e)))?;

        Ok(parsed
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| item.volume_info)
            .collect())
    }

    fn cached(&self, key: &str) -> Option<BookDetails> {
        let cache = self.cache.lock().ok()?;
        cache
            .get(key)
            .filter(|entry| entry.created_at.elapsed() < CACHE_TTL)
            .map(|entry| entry.data.clone())
    }

    fn remember(&self, key: String, data: BookDetails) {
        let Ok(mut cache) = self.cache.lock() else {
            return;
        };

        if cache.len() >= MAX_CACHE_ENTRIES {
            cache.retain(|_, entry| entry.created_at.elapsed() < CACHE_TTL);
        }
        if cache.len() >= MAX_CACHE_ENTRIES {
            let oldest = cache
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                cache.remove(&oldest);
            }
        }

        cache.insert(
            key,
            CacheEntry {
                data,
                created_at: Instant::now(),
            },
        );
    }
}

#[async_trait]
impl MetadataLookup for GoogleBooksClient {
    async fn lookup(&self, title: &str, author: &str) -> Result<BookDetails, DomainError> {
        let title = title.trim();
        let author = author.trim();
        if title.is_empty() && author.is_empty() {
            return Err(DomainError::Validation(
                "A title or an author is required".to_string(),
            ));
        }

        let cache_key = cache_key(title, author);
        if let Some(hit) = self.cached(&cache_key) {
            tracing::debug!("Google Books cache hit for '{}'", cache_key);
            return Ok(hit);
        }

        let mut candidates = self.search(title, author).await?;
        if candidates.is_empty() && !author.is_empty() && !title.is_empty() {
            tracing::debug!("No match with author '{}', retrying by title only", author);
            candidates = self.search(title, "").await?;
        }

        let best = best_match(&candidates, title, author).ok_or(DomainError::NotFound)?;
        let details = to_details(best);

        tracing::info!(
            "Google Books resolved '{}' / '{}' to '{}'",
            title,
            author,
            details.title
        );
        self.remember(cache_key, details.clone());
        Ok(details)
    }
}

/// Case- and spacing-insensitive, but otherwise lossless, form of a query
fn cache_key(title: &str, author: &str) -> String {
    let fold = |text: &str| {
        text.nfkc()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    };
    format!("{}\u{1f}{}", fold(title), fold(author))
}

fn upgrade_scheme(link: &str) -> String {
    match link.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => link.to_string(),
    }
}

/// Lower-cased ASCII form used for scoring only
fn normalize(text: &str) -> String {
    text.nfkd()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn score(candidate: &GoogleVolumeInfo, title: &str, author: &str) -> f64 {
    let title_score = candidate
        .title
        .as_deref()
        .map(|t| jaro_winkler(&normalize(t), title))
        .unwrap_or(0.0);

    let author_score = candidate
        .authors
        .as_ref()
        .map(|authors| {
            authors
                .iter()
                .map(|a| jaro_winkler(&normalize(a), author))
                .fold(0.0, f64::max)
        })
        .unwrap_or(0.0);

    match (title.is_empty(), author.is_empty()) {
        (false, true) => title_score,
        (true, false) => author_score,
        _ => 0.7 * title_score + 0.3 * author_score,
    }
}

/// Highest scoring candidate; ties keep API order
fn best_match<'a>(
    candidates: &'a [GoogleVolumeInfo],
    title: &str,
    author: &str,
) -> Option<&'a GoogleVolumeInfo> {
    let title = normalize(title);
    let author = normalize(author);

    let mut best: Option<(&GoogleVolumeInfo, f64)> = None;
    for candidate in candidates {
        let s = score(candidate, &title, &author);
        match best {
            Some((_, best_score)) if s <= best_score => {}
            _ => best = Some((candidate, s)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

fn join_or_unknown(values: &Option<Vec<String>>) -> String {
    match values {
        Some(v) if !v.is_empty() => v.join(", "),
        _ => UNKNOWN.to_string(),
    }
}

fn to_details(info: &GoogleVolumeInfo) -> BookDetails {
    BookDetails {
        title: info.title.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        authors: join_or_unknown(&info.authors),
        categories: join_or_unknown(&info.categories),
        publisher: info
            .publisher
            .clone()
            .unwrap_or_else(|| UNKNOWN.to_string()),
        // Google Books returns http links often, upgrade to https
        info_link: info
            .info_link
            .as_deref()
            .map(upgrade_scheme)
            .unwrap_or_else(|| UNKNOWN.to_string()),
    }
}
