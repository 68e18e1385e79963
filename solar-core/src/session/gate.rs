use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::state::{SessionState, Verification};
use super::store::SessionStore;
use crate::models::{AdminIdentity, AdminSession, LoginCredentials};
use crate::services::{AuthService, ServiceError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    /// Bad credentials, or the backend rejected the login.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// A session that was accepted earlier has been rejected by the backend.
    #[error("session expired")]
    SessionExpired,

    /// A privileged request failed for a reason other than the session.
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    /// A privileged operation was attempted without a session.
    #[error("not signed in")]
    NotAuthenticated,

    /// Another login or logout is still in flight.
    #[error("{0} already in progress")]
    OperationInFlight(&'static str),
}

impl GateError {
    /// Short, non-technical message suitable for a toast or status line.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed(_) => "Login failed. Check credentials.",
            Self::SessionExpired => "Your session has expired. Please sign in again.",
            Self::FetchFailed(_) => "Could not load data. Please try again.",
            Self::NotAuthenticated => "Please sign in to continue.",
            Self::OperationInFlight(_) => "Please wait for the current request to finish.",
        }
    }

    /// Whether offering a manual retry makes sense.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailed(_) | Self::OperationInFlight(_))
    }

    /// Whether the caller should send the user to the login entry point.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::NotAuthenticated)
    }
}

/// Result of an explicit logout. The gate is always unauthenticated
/// afterwards; this only reports whether the backend heard about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub backend_acknowledged: bool,
}

/// Owner of the admin session state.
///
/// The state only changes through [`login`](Self::login),
/// [`logout`](Self::logout), and the expiry path of
/// [`run_privileged`](Self::run_privileged). Observers subscribe through
/// [`subscribe`](Self::subscribe).
pub struct SessionGate {
    auth: Arc<dyn AuthService>,
    store: Arc<dyn SessionStore>,
    state: watch::Sender<SessionState>,
}

/// Marks a login/logout as in flight. If the operation's future is dropped
/// before it finishes, the state it replaced is put back.
struct InFlight<'a> {
    state: &'a watch::Sender<SessionState>,
    previous: Option<SessionState>,
}

impl InFlight<'_> {
    fn previous(&self) -> Option<&SessionState> {
        self.previous.as_ref()
    }

    fn finish(mut self, next: SessionState) {
        self.previous = None;
        self.state.send_replace(next);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.state.send_replace(previous);
        }
    }
}

impl SessionGate {
    /// Builds a gate from whatever `store` holds.
    ///
    /// A stored session makes the gate start out authenticated without any
    /// network call, marked [`Verification::Restored`] until the backend
    /// accepts a privileged request. A store that cannot be read is treated
    /// as empty.
    pub async fn restore(
        auth: Arc<dyn AuthService>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let initial = match store.load().await {
            Ok(Some(session)) => {
                debug!(email = %session.identity.email, "restored admin session from storage");
                SessionState::Authenticated {
                    session,
                    verification: Verification::Restored,
                }
            }
            Ok(None) => SessionState::Unauthenticated,
            Err(error) => {
                warn!(%error, "could not read stored session; starting signed out");
                SessionState::Unauthenticated
            }
        };

        Self {
            auth,
            store,
            state: watch::Sender::new(initial),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Receiver that observes every state change, including the
    /// `Authenticating` window.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Signs in with `credentials`.
    ///
    /// On success the session is persisted and the gate becomes
    /// authenticated. On failure the gate is unauthenticated; nothing is
    /// retried.
    ///
    /// # Errors
    /// * [`GateError::OperationInFlight`]: another login/logout is running.
    /// * [`GateError::AuthenticationFailed`]: the backend did not accept
    ///   the credentials.
    pub async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AdminIdentity, GateError> {
        let in_flight = self.begin("login")?;

        match self.auth.login(credentials).await {
            Ok(session) => {
                if let Err(error) = self.store.save(&session).await {
                    warn!(%error, "signed in but could not persist session");
                }
                let identity = session.identity.clone();
                info!(email = %identity.email, "admin signed in");
                in_flight.finish(SessionState::Authenticated {
                    session,
                    verification: Verification::Confirmed,
                });
                Ok(identity)
            }
            Err(error) => {
                warn!(email = %credentials.email, %error, "admin login failed");
                let replaced = in_flight.previous().is_some_and(SessionState::is_authenticated);
                if replaced {
                    if let Err(error) = self.store.clear().await {
                        warn!(%error, "could not clear replaced session from storage");
                    }
                }
                in_flight.finish(SessionState::Unauthenticated);
                Err(GateError::AuthenticationFailed(error.to_string()))
            }
        }
    }

    /// Signs out.
    ///
    /// The gate ends unauthenticated and the stored session is cleared even
    /// when the backend call fails.
    ///
    /// # Errors
    /// * [`GateError::OperationInFlight`]: another login/logout is running.
    pub async fn logout(&self) -> Result<LogoutOutcome, GateError> {
        let in_flight = self.begin("logout")?;
        let session = in_flight.previous().and_then(SessionState::session).cloned();

        let backend_acknowledged = match &session {
            Some(session) => match self.auth.logout(session).await {
                Ok(()) => true,
                Err(error) => {
                    warn!(%error, "backend logout failed; clearing local session anyway");
                    false
                }
            },
            None => false,
        };

        if let Err(error) = self.store.clear().await {
            warn!(%error, "could not clear stored session");
        }
        in_flight.finish(SessionState::Unauthenticated);
        info!(backend_acknowledged, "admin signed out");

        Ok(LogoutOutcome {
            backend_acknowledged,
        })
    }

    /// Runs a privileged backend call with the current session.
    ///
    /// A restored session becomes [`Verification::Confirmed`] once the
    /// backend accepts a call. If the backend rejects the session, the gate
    /// drops it (memory and storage) and reports
    /// [`GateError::SessionExpired`].
    ///
    /// # Errors
    /// * [`GateError::NotAuthenticated`]: no session is held.
    /// * [`GateError::SessionExpired`]: the backend rejected the session.
    /// * [`GateError::FetchFailed`]: any other failure of `call`.
    pub async fn run_privileged<T, F, Fut>(
        &self,
        call: F,
    ) -> Result<T, GateError>
    where
        F: FnOnce(AdminSession) -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let session = self
            .state
            .borrow()
            .session()
            .cloned()
            .ok_or(GateError::NotAuthenticated)?;

        match call(session.clone()).await {
            Ok(value) => {
                self.confirm(&session);
                Ok(value)
            }
            Err(ServiceError::Unauthorized) => {
                self.expire(&session).await;
                Err(GateError::SessionExpired)
            }
            Err(error) => Err(GateError::FetchFailed(error.to_string())),
        }
    }

    fn begin(
        &self,
        operation: &'static str,
    ) -> Result<InFlight<'_>, GateError> {
        let mut previous = None;
        self.state.send_if_modified(|state| {
            if state.is_authenticating() {
                return false;
            }
            previous = Some(std::mem::replace(state, SessionState::Authenticating));
            true
        });

        match previous {
            Some(previous) => Ok(InFlight {
                state: &self.state,
                previous: Some(previous),
            }),
            None => {
                debug!(operation, "rejected: another session operation is in flight");
                Err(GateError::OperationInFlight(operation))
            }
        }
    }

    fn confirm(&self, used: &AdminSession) {
        self.state.send_if_modified(|state| match state {
            SessionState::Authenticated {
                session,
                verification,
            } if session == used && *verification == Verification::Restored => {
                debug!(email = %session.identity.email, "restored session confirmed by backend");
                *verification = Verification::Confirmed;
                true
            }
            _ => false,
        });
    }

    /// Drops `used` if it is still the current session. A session that was
    /// replaced by a newer login while the call was in flight is left alone.
    async fn expire(&self, used: &AdminSession) {
        let expired = self.state.send_if_modified(|state| {
            if state.session() == Some(used) {
                *state = SessionState::Unauthenticated;
                true
            } else {
                false
            }
        });

        if expired {
            warn!(email = %used.identity.email, "backend rejected session; signed out");
            if let Err(error) = self.store.clear().await {
                warn!(%error, "could not clear expired session from storage");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;

    use super::*;
    use crate::models::SessionCredential;
    use crate::session::store::{MemorySessionStore, StoreError};

    // ── stubs ────────────────────────────────────────────────────────────

    fn admin_session(email: &str) -> AdminSession {
        AdminSession::new(
            AdminIdentity {
                id: Some("1".to_string()),
                email: email.to_string(),
                name: Some("Admin".to_string()),
            },
            Some(SessionCredential::new(format!("sid={email}"))),
        )
    }

    /// Auth backend that accepts one password and can be told to fail
    /// logouts. Counts every call.
    #[derive(Default)]
    struct StubAuth {
        logout_fails: bool,
        login_calls: AtomicUsize,
        logout_calls: AtomicUsize,
    }

    #[async_trait]
    impl AuthService for StubAuth {
        async fn login(
            &self,
            credentials: &LoginCredentials,
        ) -> Result<AdminSession, ServiceError> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            if credentials.password == "correct horse" {
                Ok(admin_session(&credentials.email))
            } else {
                Err(ServiceError::Unauthorized)
            }
        }

        async fn logout(&self, _session: &AdminSession) -> Result<(), ServiceError> {
            self.logout_calls.fetch_add(1, Ordering::SeqCst);
            if self.logout_fails {
                Err(ServiceError::Transport("connection reset".to_string()))
            } else {
                Ok(())
            }
        }
    }

    /// Auth backend whose login blocks until released, so tests can observe
    /// the in-flight window.
    struct BlockingAuth {
        release: Arc<Notify>,
    }

    #[async_trait]
    impl AuthService for BlockingAuth {
        async fn login(
            &self,
            credentials: &LoginCredentials,
        ) -> Result<AdminSession, ServiceError> {
            self.release.notified().await;
            Ok(admin_session(&credentials.email))
        }

        async fn logout(&self, _session: &AdminSession) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl SessionStore for BrokenStore {
        async fn load(&self) -> Result<Option<AdminSession>, StoreError> {
            Err(StoreError::Backend("disk on fire".to_string()))
        }
        async fn save(&self, _session: &AdminSession) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk on fire".to_string()))
        }
        async fn clear(&self) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk on fire".to_string()))
        }
    }

    fn good_credentials() -> LoginCredentials {
        LoginCredentials::new("admin@sunrise.test", "correct horse")
    }

    async fn fresh_gate(auth: Arc<StubAuth>) -> (SessionGate, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        let gate = SessionGate::restore(auth, store.clone()).await;
        (gate, store)
    }

    // ── restore ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn empty_store_starts_unauthenticated() {
        let (gate, _) = fresh_gate(Arc::new(StubAuth::default())).await;

        assert_eq!(gate.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn stored_session_restores_without_network_call() {
        let auth = Arc::new(StubAuth::default());
        let store = Arc::new(MemorySessionStore::with_session(admin_session(
            "admin@sunrise.test",
        )));

        let gate = SessionGate::restore(auth.clone(), store).await;

        assert!(gate.is_authenticated());
        assert!(!gate.state().is_verified());
        assert_eq!(auth.login_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unreadable_store_starts_unauthenticated() {
        let gate = SessionGate::restore(Arc::new(StubAuth::default()), Arc::new(BrokenStore)).await;

        assert_eq!(gate.state(), SessionState::Unauthenticated);
    }

    // ── login ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn successful_login_authenticates_and_persists() {
        let (gate, store) = fresh_gate(Arc::new(StubAuth::default())).await;

        let identity = gate.login(&good_credentials()).await.unwrap();

        assert_eq!(identity.email, "admin@sunrise.test");
        assert!(gate.state().is_verified());
        assert_eq!(
            store.load().await.unwrap(),
            Some(admin_session("admin@sunrise.test"))
        );
    }

    #[tokio::test]
    async fn login_survives_simulated_reload() {
        let auth = Arc::new(StubAuth::default());
        let (gate, store) = fresh_gate(auth.clone()).await;
        gate.login(&good_credentials()).await.unwrap();
        drop(gate);

        let reloaded = SessionGate::restore(auth.clone(), store).await;

        assert!(reloaded.is_authenticated());
        assert_eq!(auth.login_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_login_leaves_gate_unauthenticated() {
        let (gate, store) = fresh_gate(Arc::new(StubAuth::default())).await;

        let result = gate
            .login(&LoginCredentials::new("admin@sunrise.test", "wrong"))
            .await;

        assert!(matches!(result, Err(GateError::AuthenticationFailed(_))));
        assert_eq!(gate.state(), SessionState::Unauthenticated);
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn failed_relogin_drops_stored_session_too() {
        let auth = Arc::new(StubAuth::default());
        let store = Arc::new(MemorySessionStore::with_session(admin_session("old@x.in")));
        let gate = SessionGate::restore(auth.clone(), store.clone()).await;
        assert!(gate.is_authenticated());

        let result = gate
            .login(&LoginCredentials::new("new@x.in", "wrong"))
            .await;

        assert!(matches!(result, Err(GateError::AuthenticationFailed(_))));
        assert_eq!(gate.state(), SessionState::Unauthenticated);
        assert_eq!(store.load().await.unwrap(), None);
        let reloaded = SessionGate::restore(auth, store).await;
        assert_eq!(reloaded.state(), gate.state());
    }

    #[tokio::test]
    async fn login_still_authenticates_when_store_write_fails() {
        let gate = SessionGate::restore(Arc::new(StubAuth::default()), Arc::new(BrokenStore)).await;

        gate.login(&good_credentials()).await.unwrap();

        assert!(gate.is_authenticated());
    }

    #[tokio::test]
    async fn concurrent_login_is_rejected_while_in_flight() {
        let release = Arc::new(Notify::new());
        let gate = Arc::new(
            SessionGate::restore(
                Arc::new(BlockingAuth {
                    release: release.clone(),
                }),
                Arc::new(MemorySessionStore::new()),
            )
            .await,
        );
        let mut states = gate.subscribe();

        let first = tokio::spawn({
            let gate = gate.clone();
            async move { gate.login(&good_credentials()).await }
        });
        states
            .wait_for(SessionState::is_authenticating)
            .await
            .unwrap();

        let second = gate.login(&good_credentials()).await;
        assert_eq!(second, Err(GateError::OperationInFlight("login")));

        release.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert!(gate.is_authenticated());
    }

    #[tokio::test]
    async fn dropped_login_restores_previous_state() {
        let gate = SessionGate::restore(
            Arc::new(BlockingAuth {
                release: Arc::new(Notify::new()),
            }),
            Arc::new(MemorySessionStore::new()),
        )
        .await;

        let attempt = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            gate.login(&good_credentials()),
        )
        .await;

        assert!(attempt.is_err(), "login should still have been blocked");
        assert_eq!(gate.state(), SessionState::Unauthenticated);
    }

    // ── logout ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn logout_clears_session_and_storage() {
        let auth = Arc::new(StubAuth::default());
        let (gate, store) = fresh_gate(auth.clone()).await;
        gate.login(&good_credentials()).await.unwrap();

        let outcome = gate.logout().await.unwrap();

        assert!(outcome.backend_acknowledged);
        assert_eq!(gate.state(), SessionState::Unauthenticated);
        assert_eq!(store.load().await.unwrap(), None);
        assert_eq!(auth.logout_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn logout_succeeds_locally_when_backend_fails() {
        let auth = Arc::new(StubAuth {
            logout_fails: true,
            ..StubAuth::default()
        });
        let (gate, store) = fresh_gate(auth).await;
        gate.login(&good_credentials()).await.unwrap();

        let outcome = gate.logout().await.unwrap();

        assert!(!outcome.backend_acknowledged);
        assert_eq!(gate.state(), SessionState::Unauthenticated);
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn logout_without_session_skips_backend() {
        let auth = Arc::new(StubAuth::default());
        let (gate, _) = fresh_gate(auth.clone()).await;

        let outcome = gate.logout().await.unwrap();

        assert!(!outcome.backend_acknowledged);
        assert_eq!(auth.logout_calls.load(Ordering::SeqCst), 0);
    }

    // ── privileged calls ─────────────────────────────────────────────────

    #[tokio::test]
    async fn privileged_call_requires_session() {
        let (gate, _) = fresh_gate(Arc::new(StubAuth::default())).await;

        let result = gate.run_privileged(|_| async { Ok(1) }).await;

        assert_eq!(result, Err(GateError::NotAuthenticated));
    }

    #[tokio::test]
    async fn accepted_call_confirms_restored_session() {
        let store = Arc::new(MemorySessionStore::with_session(admin_session(
            "admin@sunrise.test",
        )));
        let gate = SessionGate::restore(Arc::new(StubAuth::default()), store).await;
        let seen = Mutex::new(None);

        let result = gate
            .run_privileged(|session| {
                *seen.lock().unwrap() = Some(session.identity.email.clone());
                async { Ok("rows") }
            })
            .await;

        assert_eq!(result, Ok("rows"));
        assert!(gate.state().is_verified());
        assert_eq!(
            seen.lock().unwrap().as_deref(),
            Some("admin@sunrise.test")
        );
    }

    #[tokio::test]
    async fn rejected_call_expires_session() {
        let store = Arc::new(MemorySessionStore::with_session(admin_session(
            "admin@sunrise.test",
        )));
        let gate = SessionGate::restore(Arc::new(StubAuth::default()), store.clone()).await;

        let result: Result<(), _> = gate
            .run_privileged(|_| async { Err(ServiceError::Unauthorized) })
            .await;

        assert_eq!(result, Err(GateError::SessionExpired));
        assert_eq!(gate.state(), SessionState::Unauthenticated);
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn other_failures_keep_session() {
        let (gate, _) = fresh_gate(Arc::new(StubAuth::default())).await;
        gate.login(&good_credentials()).await.unwrap();

        let result: Result<(), _> = gate
            .run_privileged(|_| async {
                Err(ServiceError::Rejected {
                    status: 500,
                    message: "boom".to_string(),
                })
            })
            .await;

        assert!(matches!(result, Err(GateError::FetchFailed(_))));
        assert!(gate.is_authenticated());
    }

    // ── GateError ────────────────────────────────────────────────────────

    #[test]
    fn error_classification() {
        assert!(GateError::FetchFailed("x".to_string()).is_retryable());
        assert!(!GateError::SessionExpired.is_retryable());
        assert!(GateError::SessionExpired.requires_login());
        assert!(!GateError::AuthenticationFailed("x".to_string()).requires_login());
        assert_eq!(
            GateError::AuthenticationFailed("x".to_string()).user_message(),
            "Login failed. Check credentials."
        );
    }
}
