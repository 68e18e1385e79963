//! Ports for the external collaborators: the auth backend and the contact
//! submissions API. Transport adapters live in other crates.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AdminSession, ContactSubmission, LoginCredentials, NewContactSubmission};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The backend refused the session or credentials (401/403).
    #[error("Unauthorized")]
    Unauthorized,

    /// Any other non-success response.
    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange credentials for a backend-issued session.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AdminSession, ServiceError>;

    /// Ask the backend to end `session`.
    async fn logout(&self, session: &AdminSession) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait ContactService: Send + Sync {
    /// Every stored submission. Privileged: requires an admin session.
    async fn list_submissions(
        &self,
        session: &AdminSession,
    ) -> Result<Vec<ContactSubmission>, ServiceError>;

    /// Send one message from the public contact form.
    async fn submit(&self, submission: &NewContactSubmission) -> Result<(), ServiceError>;
}
