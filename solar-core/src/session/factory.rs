use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::store::{MemorySessionStore, SessionStore, StoreError};

/// Backend-agnostic session storage configuration.
///
/// `backend` must match the [`SessionStoreFactory::backend_name`] of a
/// registered factory.  `location` is passed through to that factory
/// unchanged: its meaning is entirely backend-specific.
///
/// | backend    | location examples                   |
/// |------------|-------------------------------------|
/// | `memory`   | ignored                             |
/// | `sqlite`   | `session.db`, `:memory:`            |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"sqlite"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub location: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            location: String::new(),
        }
    }
}

/// One implementation per storage backend.  Each backend crate exports a
/// single unit struct that implements this trait and is registered with a
/// [`SessionStoreRegistry`] at startup.
#[async_trait]
pub trait SessionStoreFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open (or create) the store. Implementations may run migrations here.
    async fn create(&self, config: &StoreConfig) -> Result<Arc<dyn SessionStore>, StoreError>;
}

/// Factory for [`MemorySessionStore`].
pub struct MemoryStoreFactory;

#[async_trait]
impl SessionStoreFactory for MemoryStoreFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, _config: &StoreConfig) -> Result<Arc<dyn SessionStore>, StoreError> {
        Ok(Arc::new(MemorySessionStore::new()))
    }
}

/// Registry of [`SessionStoreFactory`] instances, keyed by backend name.
pub struct SessionStoreRegistry {
    factories: HashMap<&'static str, Box<dyn SessionStoreFactory>>,
}

impl SessionStoreRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry with the in-process [`MemoryStoreFactory`] already
    /// registered.
    pub fn with_memory() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MemoryStoreFactory));
        registry
    }

    /// Register a backend factory.
    ///
    /// If a factory with the same [`SessionStoreFactory::backend_name`] is
    /// already present it is silently replaced.
    pub fn register(&mut self, factory: Box<dyn SessionStoreFactory>) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory that matches `config.backend`.
    ///
    /// # Errors
    /// * [`StoreError::Configuration`]: no factory is registered for the
    ///   requested backend name.
    /// * Any error the chosen factory itself returns.
    pub async fn create(&self, config: &StoreConfig) -> Result<Arc<dyn SessionStore>, StoreError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                StoreError::Configuration(format!(
                    "unknown session store '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for SessionStoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}
