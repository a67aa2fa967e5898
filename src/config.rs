use std::{fmt, path::Path};

use crate::error::ConfigError;

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DATABASE_USER: &str = "DATABASE_USER";
pub const DATABASE_PASSWORD: &str = "DATABASE_PASSWORD";

/// Resolved connection parameters for the person store.
///
/// SQLite does not authenticate, so `user` and `password` are carried for
/// engines that do and are never sent to the database file.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub url: String,
    pub user: String,
    pub password: String,
}

/// Settings given on the command line, which win over the environment.
#[derive(Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: String::new(),
            password: String::new(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves each setting from `overrides` first, then from `lookup`.
    pub fn resolve<F>(overrides: &Overrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|key| {
            let overridden = match key {
                DATABASE_URL => overrides.url.clone(),
                DATABASE_USER => overrides.user.clone(),
                DATABASE_PASSWORD => overrides.password.clone(),
                _ => None,
            };
            overridden.or_else(|| lookup(key))
        })
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(DATABASE_URL)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL))?;

        Ok(Self {
            url,
            user: lookup(DATABASE_USER).unwrap_or_default(),
            password: lookup(DATABASE_PASSWORD).unwrap_or_default(),
        })
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Loads variables from an env file into the process environment.
///
/// Without an explicit path a missing `./.env` is fine, an explicit path must exist.
pub fn load_env_file(path: Option<&Path>) -> Result<(), ConfigError> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)?;
            tracing::info!("Loaded environment from {}", path.display());
        }
        None => match dotenvy::dotenv() {
            Ok(path) => tracing::info!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => tracing::debug!("No .env file found, using environment"),
            Err(e) => return Err(e.into()),
        },
    }
    Ok(())
}
