use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use solar_core::{AdminIdentity, AdminSession, SessionCredential, SessionStore, StoreError};
use sqlx::FromRow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

const MEMORY_LOCATION: &str = ":memory:";

pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Opens the database at `location`, creating the file if needed.
    ///
    /// `":memory:"` gives an ephemeral database that lives as long as the
    /// store.
    pub async fn open(location: &str) -> Result<Self, StoreError> {
        let options = if location == MEMORY_LOCATION {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::Configuration(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(Path::new(location))
                .create_if_missing(true)
        };

        // One connection: an in-memory database is private to its connection,
        // and a single-row table gains nothing from more.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(format!("{location}: {e}")))?;

        debug!(location, "opened session database");
        Ok(Self { pool })
    }

    /// Wraps an existing pool. Migrations are not run.
    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[derive(FromRow)]
struct AdminSessionRow {
    identity: String,
    credential: Option<String>,
}

impl TryFrom<AdminSessionRow> for AdminSession {
    type Error = StoreError;

    fn try_from(row: AdminSessionRow) -> Result<Self, Self::Error> {
        let identity: AdminIdentity =
            serde_json::from_str(&row.identity).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(AdminSession::new(
            identity,
            row.credential.map(SessionCredential::new),
        ))
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load(&self) -> Result<Option<AdminSession>, StoreError> {
        let row = sqlx::query_as::<_, AdminSessionRow>(
            "SELECT identity, credential FROM admin_session WHERE slot = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(AdminSession::try_from).transpose()
    }

    async fn save(&self, session: &AdminSession) -> Result<(), StoreError> {
        let identity = serde_json::to_string(&session.identity)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        sqlx::query(
            "INSERT INTO admin_session (slot, identity, credential, saved_at)
             VALUES (1, ?, ?, ?)
             ON CONFLICT(slot) DO UPDATE SET
                identity = excluded.identity,
                credential = excluded.credential,
                saved_at = excluded.saved_at",
        )
        .bind(identity)
        .bind(session.credential.as_ref().map(|c| c.expose().to_string()))
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM admin_session")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}
