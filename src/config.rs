use std::env;
use std::fmt;

use thiserror::Error;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const ADMIN_PASSWORD_VAR: &str = "ADMIN_PASSWORD";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Settings read once at cold start and passed into the store and handler.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    admin_password: String,
}

impl Config {
    pub fn new(database_url: impl Into<String>, admin_password: impl Into<String>) -> Result<Self, ConfigError> {
        let database_url = database_url.into();
        let admin_password = admin_password.into();
        if database_url.trim().is_empty() {
            return Err(ConfigError::Empty(DATABASE_URL_VAR));
        }
        // An empty secret would let a blank header through the write gate.
        if admin_password.is_empty() {
            return Err(ConfigError::Empty(ADMIN_PASSWORD_VAR));
        }
        Ok(Self { database_url, admin_password })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(DATABASE_URL_VAR).ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;
        let admin_password = lookup(ADMIN_PASSWORD_VAR).ok_or(ConfigError::Missing(ADMIN_PASSWORD_VAR))?;
        Self::new(database_url, admin_password)
    }

    pub fn admin_password(&self) -> &str {
        &self.admin_password
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"<redacted>")
            .field("admin_password", &"<redacted>")
            .finish()
    }
}
