use std::time::Duration;

use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use solar_core::{AdminSession, ServiceError, SessionCredential};
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!("solar-savings/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Shared HTTP client plus the backend's base URL.
///
/// Cheap to clone; both services can hold their own copy.
#[derive(Debug, Clone)]
pub struct Backend {
    client: Client,
    base: String,
}

impl Backend {
    /// # Errors
    ///
    /// Returns an error when `base_url` is not an absolute http(s) URL or the
    /// reqwest client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let parsed = Url::parse(base_url.trim()).map_err(|e| BackendError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BackendError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }
}

/// Attaches the session cookie, if the session carries one.
pub(crate) fn with_session(request: RequestBuilder, session: &AdminSession) -> RequestBuilder {
    match &session.credential {
        Some(credential) => request.header(COOKIE, credential.expose()),
        None => request,
    }
}

/// Collects `Set-Cookie` headers into a single `Cookie` header value.
///
/// Only the `name=value` part of each cookie is kept; attributes such as
/// `Path` or `HttpOnly` are dropped.
pub(crate) fn session_cookie(headers: &HeaderMap) -> Option<SessionCredential> {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .collect();

    (!pairs.is_empty()).then(|| SessionCredential::new(pairs.join("; ")))
}

pub(crate) fn map_transport_error(error: reqwest::Error) -> ServiceError {
    if error.is_timeout() {
        ServiceError::Transport(format!("request timed out: {error}"))
    } else {
        ServiceError::Transport(error.to_string())
    }
}

pub(crate) fn map_status_error(status: StatusCode, body: &[u8]) -> ServiceError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Unauthorized,
        _ => ServiceError::Rejected {
            status: status.as_u16(),
            message: error_message(body),
        },
    }
}

/// The backend reports errors as `{"message": "..."}`; anything else is
/// shown as a short preview of the body.
fn error_message(body: &[u8]) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => body_preview(body),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
