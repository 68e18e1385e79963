//! Layered configuration: defaults, then `solar.toml`, then `SOLAR_*`
//! environment variables, then command-line flags.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use solar_core::calculations::SubsidyPolicy;
use solar_core::session::StoreConfig;
use solar_core::{EstimatorConfig, EstimatorConfigError};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "solar.toml";

pub const ENV_BACKEND_URL: &str = "SOLAR_BACKEND_URL";
pub const ENV_STORE_BACKEND: &str = "SOLAR_STORE_BACKEND";
pub const ENV_STORE_PATH: &str = "SOLAR_STORE_PATH";
pub const ENV_SUBSIDY_POLICY: &str = "SOLAR_SUBSIDY_POLICY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {reason}")]
    InvalidEnv { var: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("invalid estimator settings: {0}")]
    Estimator(#[from] EstimatorConfigError),

    #[error("no backend URL configured (set backend_url in solar.toml, SOLAR_BACKEND_URL, or --backend-url)")]
    MissingBackendUrl,
}

/// Where the admin session is kept between runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    /// Registered backend name: `sqlite` or `memory`.
    pub backend: String,
    /// Backend-specific location, a file path for `sqlite`.
    pub path: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            path: "solar-session.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarConfig {
    /// Base URL of the site's API, e.g. `https://api.example.in/api`.
    pub backend_url: Option<String>,
    pub request_timeout_secs: u64,
    /// Append log records to this file in addition to stderr.
    pub log_file: Option<PathBuf>,
    /// Replace the built-in region tariffs with this CSV.
    pub tariffs_file: Option<PathBuf>,
    /// Replace the built-in city list with this CSV.
    pub cities_file: Option<PathBuf>,
    pub store: StoreSection,
    pub estimator: EstimatorConfig,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            request_timeout_secs: 15,
            log_file: None,
            tariffs_file: None,
            cities_file: None,
            store: StoreSection::default(),
            estimator: EstimatorConfig::default(),
        }
    }
}

/// Values given on the command line. `None` leaves the lower layer alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub backend_url: Option<String>,
    pub store_backend: Option<String>,
    pub store_path: Option<String>,
    pub subsidy_policy: Option<SubsidyPolicy>,
    pub log_file: Option<PathBuf>,
}

impl SolarConfig {
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Reads `path`, or `solar.toml` in the working directory when no path is
    /// given. A missing default file is not an error; a missing explicit one
    /// is.
    pub fn load_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !explicit && !path.exists() {
            debug!("no {DEFAULT_CONFIG_FILE} found; using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Applies `SOLAR_*` variables as returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_BACKEND_URL) {
            self.backend_url = Some(url);
        }
        if let Some(backend) = non_empty(ENV_STORE_BACKEND) {
            self.store.backend = backend.trim().to_lowercase();
        }
        if let Some(path) = non_empty(ENV_STORE_PATH) {
            self.store.path = path;
        }
        if let Some(policy) = non_empty(ENV_SUBSIDY_POLICY) {
            self.estimator.subsidy_policy =
                SubsidyPolicy::from_str(&policy).map_err(|e| ConfigError::InvalidEnv {
                    var: ENV_SUBSIDY_POLICY,
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.backend_url {
            self.backend_url = Some(url);
        }
        if let Some(backend) = overrides.store_backend {
            self.store.backend = backend.trim().to_lowercase();
        }
        if let Some(path) = overrides.store_path {
            self.store.path = path;
        }
        if let Some(policy) = overrides.subsidy_policy {
            self.estimator.subsidy_policy = policy;
        }
        if let Some(path) = overrides.log_file {
            self.log_file = Some(path);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.store.backend.trim().is_empty() {
            return Err(ConfigError::Invalid("store.backend must not be empty".to_string()));
        }
        self.estimator.validate()?;
        Ok(())
    }

    /// File, then process environment, then flags; validated.
    pub fn resolve(path: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let mut config = Self::load_file(path)?;
        config.apply_env(|var| std::env::var(var).ok())?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            backend: self.store.backend.clone(),
            location: self.store.path.clone(),
        }
    }

    pub fn backend_url(&self) -> Result<&str, ConfigError> {
        self.backend_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingBackendUrl)
    }
}
