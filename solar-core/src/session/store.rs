use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::AdminSession;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Backend(String),

    #[error("Stored session is unreadable: {0}")]
    Corrupt(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Durable home of the admin session between runs.
///
/// Holds at most one session; `save` replaces whatever was there.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<AdminSession>, StoreError>;
    async fn save(&self, session: &AdminSession) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Process-local store. Nothing survives a restart; useful for tests and for
/// running without a database.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<AdminSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `session`, as if written by an earlier run.
    pub fn with_session(session: AdminSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<AdminSession>, StoreError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn save(&self, session: &AdminSession) -> Result<(), StoreError> {
        *self.slot.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().await = None;
        Ok(())
    }
}
