use serde::{Deserialize, Serialize};

use crate::models::{AdminIdentity, AdminSession};

/// How much the client knows about an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verification {
    /// Read back from durable storage at start-up; the backend has not
    /// accepted it yet in this process and it may be stale.
    Restored,
    /// Issued by the backend in this process, or accepted by it on a
    /// privileged request since start-up.
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    /// A login or logout request is in flight.
    Authenticating,
    Authenticated {
        session: AdminSession,
        verification: Verification,
    },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn is_authenticating(&self) -> bool {
        matches!(self, Self::Authenticating)
    }

    pub fn session(&self) -> Option<&AdminSession> {
        match self {
            Self::Authenticated { session, .. } => Some(session),
            _ => None,
        }
    }

    pub fn identity(&self) -> Option<&AdminIdentity> {
        self.session().map(|s| &s.identity)
    }

    /// True only for sessions the backend has vouched for in this process.
    pub fn is_verified(&self) -> bool {
        matches!(
            self,
            Self::Authenticated {
                verification: Verification::Confirmed,
                ..
            }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticating => "authenticating",
            Self::Authenticated {
                verification: Verification::Restored,
                ..
            } => "authenticated (restored, unverified)",
            Self::Authenticated {
                verification: Verification::Confirmed,
                ..
            } => "authenticated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> AdminSession {
        AdminSession::new(
            AdminIdentity {
                id: None,
                email: "admin@sunrise.test".to_string(),
                name: None,
            },
            None,
        )
    }

    #[test]
    fn restored_session_is_authenticated_but_not_verified() {
        let state = SessionState::Authenticated {
            session: session(),
            verification: Verification::Restored,
        };

        assert!(state.is_authenticated());
        assert!(!state.is_verified());
        assert_eq!(
            state.identity().map(|i| i.email.as_str()),
            Some("admin@sunrise.test")
        );
    }

    #[test]
    fn authenticating_exposes_no_session() {
        let state = SessionState::Authenticating;

        assert!(!state.is_authenticated());
        assert!(state.is_authenticating());
        assert!(state.session().is_none());
    }
}
