use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::http::HeaderValue;
use axum::http::header;
use axum::response::{IntoResponse, Response};

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A fully rendered 200 response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Json(String),
    Html(String),
}

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        let (content_type, body) = match self {
            Self::Json(body) => ("application/json", body),
            Self::Html(body) => ("text/html; charset=utf-8", body),
        };
        let mut resp = body.into_response();
        resp.headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        resp
    }
}

#[derive(Debug, Clone)]
struct CachedEntry {
    rendered: Rendered,
    stored_at: Instant,
}

impl CachedEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// Time-bounded cache of rendered responses keyed by request path and query.
///
/// Entries are not invalidated by reloads; they only expire.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Option<Rendered> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get(key) {
            if entry.is_fresh(self.ttl) {
                return Some(entry.rendered.clone());
            }
            entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: impl Into<String>, rendered: Rendered) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| entry.is_fresh(self.ttl));
        entries.insert(
            key.into(),
            CachedEntry {
                rendered,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
