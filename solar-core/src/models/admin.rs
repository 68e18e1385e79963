use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a signed-in administrator as reported by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Opaque session value issued by the auth backend (the session cookie).
///
/// The client never inspects or verifies it; it only sends it back on
/// privileged requests.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCredential(String);

impl SessionCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCredential(***)")
    }
}

/// Everything the client keeps about a signed-in administrator.
///
/// This is the record written to durable storage on login and read back on
/// start-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub identity: AdminIdentity,
    pub credential: Option<SessionCredential>,
}

impl AdminSession {
    pub fn new(identity: AdminIdentity, credential: Option<SessionCredential>) -> Self {
        Self {
            identity,
            credential,
        }
    }
}

/// Email/password pair submitted to the login endpoint.
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}
