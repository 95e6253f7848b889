//! Cookie-keyed, in-memory session state
//!
//! Holds the staged upload between the upload, confirmation and correction
//! pages, plus one-shot flash messages.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::modules::inference::{CoverText, GenreGuess};

pub const SESSION_COOKIE: &str = "coverlens_session";

const SESSION_IDLE_TTL: Duration = Duration::from_secs(24 * 3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Error,
    Warning,
    Success,
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Error => "error",
            FlashKind::Warning => "warning",
            FlashKind::Success => "success",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

/// An uploaded cover and its inference results, awaiting confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct StagedUpload {
    pub file_name: String,
    pub genre: GenreGuess,
    pub cover: CoverText,
}

struct SessionData {
    upload: Option<StagedUpload>,
    flashes: Vec<Flash>,
    last_seen: Instant,
}

impl SessionData {
    fn new() -> Self {
        Self {
            upload: None,
            flashes: Vec::new(),
            last_seen: Instant::now(),
        }
    }
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<Uuid, SessionData>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a session as active; false if it is unknown
    fn touch(&self, id: Uuid) -> bool {
        match self.inner.get_mut(&id) {
            Some(mut data) => {
                data.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    fn create(&self) -> Uuid {
        self.inner
            .retain(|_, data| data.last_seen.elapsed() < SESSION_IDLE_TTL);

        let id = Uuid::new_v4();
        self.inner.insert(id, SessionData::new());
        tracing::debug!("Created session {} ({} active)", id, self.inner.len());
        id
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Whether a session other than `except` has `file_name` awaiting confirmation
    pub fn is_staged_elsewhere(&self, file_name: &str, except: Uuid) -> bool {
        self.inner.iter().any(|entry| {
            *entry.key() != except
                && entry
                    .value()
                    .upload
                    .as_ref()
                    .is_some_and(|upload| upload.file_name == file_name)
        })
    }

    /// Handle on an existing or new session id
    pub fn session(&self, id: Uuid) -> Session {
        Session {
            id,
            store: self.clone(),
        }
    }
}

/// Request extension set by [`session_middleware`]
#[derive(Debug, Clone, Copy)]
pub struct SessionId(pub Uuid);

fn cookie_session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// Ensure every request is tied to a session, issuing a cookie when needed
pub async fn session_middleware(
    State(store): State<SessionStore>,
    mut req: Request,
    next: Next,
) -> Response {
    let existing = cookie_session_id(req.headers()).filter(|id| store.touch(*id));
    let (id, fresh) = match existing {
        Some(id) => (id, false),
        None => (store.create(), true),
    };

    req.extensions_mut().insert(SessionId(id));
    let mut res = next.run(req).await;

    if fresh {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                res.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Failed to build session cookie: {}", e),
        }
    }

    res
}

/// Session of the current request
pub struct Session {
    id: Uuid,
    store: SessionStore,
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let SessionId(id) = parts.extensions.get::<SessionId>().copied().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Session middleware is not installed",
        ))?;

        Ok(SessionStore::from_ref(state).session(id))
    }
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn staged_upload(&self) -> Option<StagedUpload> {
        self.store
            .inner
            .get(&self.id)
            .and_then(|data| data.upload.clone())
    }

    pub fn stage_upload(&self, upload: StagedUpload) {
        self.store
            .inner
            .entry(self.id)
            .or_insert_with(SessionData::new)
            .upload = Some(upload);
    }

    pub fn clear_upload(&self) {
        if let Some(mut data) = self.store.inner.get_mut(&self.id) {
            data.upload = None;
        }
    }

    pub fn flash(&self, kind: FlashKind, message: impl Into<String>) {
        self.store
            .inner
            .entry(self.id)
            .or_insert_with(SessionData::new)
            .flashes
            .push(Flash {
                kind,
                message: message.into(),
            });
    }

    /// Drain pending flash messages
    pub fn take_flashes(&self) -> Vec<Flash> {
        self.store
            .inner
            .get_mut(&self.id)
            .map(|mut data| std::mem::take(&mut data.flashes))
            .unwrap_or_default()
    }
}
