//! Reqwest-backed adapters for the auth backend and the contact API.
//!
//! These own transport details only: URLs, the session cookie, timeouts,
//! HTTP status mapping and JSON decoding into core models.

mod auth;
mod backend;
mod contacts;

pub use auth::HttpAuthService;
pub use backend::{Backend, BackendError, DEFAULT_TIMEOUT};
pub use contacts::HttpContactService;
