//! Application configuration.
//!
//! Configuration is stored as JSON in the platform config directory
//! (`<config_dir>/storefront/config.json`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Backend environment the app talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production backend.
    #[default]
    Production,
    /// Test backend.
    Test,
}

impl Environment {
    /// Base URL of the engagement backend for this environment.
    #[must_use]
    pub const fn base_url(&self) -> &'static str {
        match self {
            Self::Production => "https://push.notifica.re",
            Self::Test => "https://push-test.notifica.re",
        }
    }
}

/// Location-related settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Whether the app should try to upgrade to "always" authorization.
    pub request_always_authorization: bool,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application key issued by the engagement backend.
    pub application_key: String,
    /// Application secret issued by the engagement backend.
    pub application_secret: String,
    /// Loyalty program used for membership cards, if any.
    #[serde(default)]
    pub loyalty_program_id: Option<String>,
    /// Backend environment.
    #[serde(default)]
    pub environment: Environment,
    /// Location settings.
    #[serde(default)]
    pub location: LocationConfig,
    /// Log filter directive used when `RUST_LOG` is not set.
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            application_key: "demo-application-key".to_string(),
            application_secret: "demo-application-secret".to_string(),
            loyalty_program_id: None,
            environment: Environment::Production,
            location: LocationConfig::default(),
            log_filter: None,
        }
    }
}

impl AppConfig {
    /// Default location of the configuration file.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("storefront")
            .join("config.json")
    }

    /// Loads the configuration from the default location.
    ///
    /// Returns the default configuration when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        let path = Self::default_path();
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load_from(&path).await
    }

    /// Loads and validates the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails validation.
    pub async fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;

        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Checks that the required credentials are present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the application key or secret is empty.
    pub fn validate(&self) -> Result<()> {
        if self.application_key.trim().is_empty() {
            return Err(Error::Config("application_key is empty".to_string()));
        }
        if self.application_secret.trim().is_empty() {
            return Err(Error::Config("application_secret is empty".to_string()));
        }
        Ok(())
    }
}
