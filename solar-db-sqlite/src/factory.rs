use std::sync::Arc;

use async_trait::async_trait;
use solar_core::session::{SessionStoreFactory, StoreConfig};
use solar_core::{SessionStore, StoreError};

use crate::store::SqliteSessionStore;

/// [`SessionStoreFactory`] for SQLite.
///
/// Register this with a [`solar_core::session::SessionStoreRegistry`] to make
/// the `"sqlite"` backend available:
///
/// ```rust,no_run
/// use solar_core::session::SessionStoreRegistry;
/// use solar_db_sqlite::SqliteStoreFactory;
///
/// let mut registry = SessionStoreRegistry::with_memory();
/// registry.register(Box::new(SqliteStoreFactory));
/// ```
pub struct SqliteStoreFactory;

#[async_trait]
impl SessionStoreFactory for SqliteStoreFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database at `config.location` and run migrations.
    ///
    /// Accepted locations:
    /// * A bare file path, e.g. `"session.db"`. Created if missing.
    /// * `":memory:"` for an ephemeral database.
    async fn create(&self, config: &StoreConfig) -> Result<Arc<dyn SessionStore>, StoreError> {
        if config.location.trim().is_empty() {
            return Err(StoreError::Configuration(
                "sqlite session store needs a file path or ':memory:'".to_string(),
            ));
        }

        let store = SqliteSessionStore::open(&config.location).await?;
        store.run_migrations().await?;
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use solar_core::session::{SessionStoreFactory, StoreConfig};
    use solar_core::StoreError;

    use super::SqliteStoreFactory;

    fn config(location: &str) -> StoreConfig {
        StoreConfig {
            backend: "sqlite".to_string(),
            location: location.to_string(),
        }
    }

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteStoreFactory.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn creates_in_memory_store() {
        let result = SqliteStoreFactory.create(&config(":memory:")).await;

        assert!(
            result.is_ok(),
            "failed to create in-memory store: {:#?}",
            result.err()
        );
    }

    #[tokio::test]
    async fn empty_location_is_configuration_error() {
        let result = SqliteStoreFactory.create(&config("  ")).await;

        assert!(matches!(result, Err(StoreError::Configuration(_))));
    }
}
