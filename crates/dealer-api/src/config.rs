//! # Application Configuration
//!
//! Read once at startup from the environment. Every setting has a fixed
//! default so the service starts with no environment at all.
//!
//! | Variable        | Default | Meaning                                   |
//! |-----------------|---------|-------------------------------------------|
//! | `PORT`          | `3030`  | HTTP listen port                          |
//! | `DATABASE_URL`  | unset   | Postgres URL; unset means in-memory store |
//! | `SEED_DIR`      | `data`  | Directory holding the fixture files       |
//! | `SEED_ON_START` | `true`  | `false` skips seeding                     |

use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3030;
pub const DEFAULT_SEED_DIR: &str = "data";

/// A setting was present but unusable.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a port number, got {value:?}")]
    InvalidPort { name: &'static str, value: String },

    #[error("{name} must be true or false, got {value:?}")]
    InvalidFlag { name: &'static str, value: String },
}

/// Application configuration.
///
/// Custom `Debug` redacts the database URL, which may carry credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Postgres connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Directory containing `reviews.json` and `dealerships.json`.
    pub seed_dir: PathBuf,
    /// Replace collection contents with the fixtures on startup.
    pub seed_on_start: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("seed_dir", &self.seed_dir)
            .field("seed_on_start", &self.seed_on_start)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            seed_dir: PathBuf::from(DEFAULT_SEED_DIR),
            seed_on_start: true,
        }
    }
}

impl AppConfig {
    /// Build configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort { name: "PORT", value })?,
            None => defaults.port,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let seed_dir = lookup("SEED_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.seed_dir);

        let seed_on_start = match lookup("SEED_ON_START") {
            Some(value) => parse_flag("SEED_ON_START", value)?,
            None => defaults.seed_on_start,
        };

        Ok(Self {
            port,
            database_url,
            seed_dir,
            seed_on_start,
        })
    }
}

fn parse_flag(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.port, 3030);
        assert_eq!(config.seed_dir, PathBuf::from("data"));
        assert!(config.seed_on_start);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            ("PORT", "8081"),
            ("DATABASE_URL", "postgres://u:p@db/dealers"),
            ("SEED_DIR", "/srv/fixtures"),
            ("SEED_ON_START", "false"),
        ])
        .unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.database_url.as_deref(), Some("postgres://u:p@db/dealers"));
        assert_eq!(config.seed_dir, PathBuf::from("/srv/fixtures"));
        assert!(!config.seed_on_start);
    }

    #[test]
    fn blank_database_url_means_memory() {
        let config = config_from(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn invalid_port_is_an_error() {
        assert_eq!(
            config_from(&[("PORT", "http")]),
            Err(ConfigError::InvalidPort {
                name: "PORT",
                value: "http".to_string()
            })
        );
        assert!(config_from(&[("PORT", "70000")]).is_err());
    }

    #[test]
    fn invalid_flag_is_an_error() {
        assert!(matches!(
            config_from(&[("SEED_ON_START", "maybe")]),
            Err(ConfigError::InvalidFlag { .. })
        ));
    }

    #[test]
    fn debug_redacts_database_url() {
        let config = config_from(&[("DATABASE_URL", "postgres://u:secret@db/x")]).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
