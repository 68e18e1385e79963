//! A session written by one process run is visible to the next.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use solar_core::session::{SessionStoreRegistry, StoreConfig};
use solar_core::{
    AdminIdentity, AdminSession, AuthService, LoginCredentials, ServiceError, SessionCredential,
    SessionGate, SessionState, Verification,
};
use solar_db_sqlite::SqliteStoreFactory;

struct StubAuth;

#[async_trait]
impl AuthService for StubAuth {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AdminSession, ServiceError> {
        Ok(AdminSession::new(
            AdminIdentity {
                id: Some("1".to_string()),
                email: credentials.email.clone(),
                name: None,
            },
            Some(SessionCredential::new("connect.sid=s%3Aabc")),
        ))
    }

    async fn logout(&self, _session: &AdminSession) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// Unique database path under the system temp dir, removed on drop.
struct TempDb(PathBuf);

impl TempDb {
    fn new(name: &str) -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        Self(std::env::temp_dir().join(format!(
            "solar-{name}-{}-{nanos}.db",
            std::process::id()
        )))
    }

    fn config(&self) -> StoreConfig {
        StoreConfig {
            backend: "sqlite".to_string(),
            location: self.0.display().to_string(),
        }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn registry() -> SessionStoreRegistry {
    let mut registry = SessionStoreRegistry::with_memory();
    registry.register(Box::new(SqliteStoreFactory));
    registry
}

#[tokio::test]
async fn test_login_is_restored_after_reopen() {
    let db = TempDb::new("restore");

    {
        let store = registry().create(&db.config()).await.expect("Should open store");
        let gate = SessionGate::restore(Arc::new(StubAuth), store).await;
        gate.login(&LoginCredentials::new("admin@sunrise.test", "pw"))
            .await
            .expect("Should log in");
    }

    let store = registry().create(&db.config()).await.expect("Should reopen store");
    let gate = SessionGate::restore(Arc::new(StubAuth), store).await;

    match gate.state() {
        SessionState::Authenticated {
            session,
            verification,
        } => {
            assert_eq!(session.identity.email, "admin@sunrise.test");
            assert_eq!(
                session.credential.as_ref().map(SessionCredential::expose),
                Some("connect.sid=s%3Aabc")
            );
            assert_eq!(verification, Verification::Restored);
        }
        other => panic!("expected restored session, got {other:?}"),
    }
}

#[tokio::test]
async fn test_logout_is_durable() {
    let db = TempDb::new("logout");

    {
        let store = registry().create(&db.config()).await.expect("Should open store");
        let gate = SessionGate::restore(Arc::new(StubAuth), store).await;
        gate.login(&LoginCredentials::new("admin@sunrise.test", "pw"))
            .await
            .expect("Should log in");
        gate.logout().await.expect("Should log out");
    }

    let store = registry().create(&db.config()).await.expect("Should reopen store");
    let gate = SessionGate::restore(Arc::new(StubAuth), store).await;

    assert_eq!(gate.state(), SessionState::Unauthenticated);
}
