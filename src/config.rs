//! Server configuration, read from the environment.
//!
//! | Variable              | Default   |
//! |-----------------------|-----------|
//! | `DATABASE_URL`        | required  |
//! | `HOST`                | `0.0.0.0` |
//! | `PORT`                | `5000`    |
//! | `STATIC_DIR`          | `static`  |
//! | `SWEEP_INTERVAL_SECS` | `3600`    |
//! | `DB_MAX_CONNECTIONS`  | `5`       |
//!
//! `DATABASE_URL` may be a `sqlite:` URL or a plain file path.
//! `SWEEP_INTERVAL_SECS` must be non-zero.

use crate::storage::{ExpiryConfig, StoreConfig};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Errors that make the configuration unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Database file path or `sqlite:` URL
    pub database_url: String,
    /// Directory holding the landing page
    pub static_dir: PathBuf,
    /// Interval between expiry sweeps
    pub sweep_interval: Duration,
    /// Storage pool size
    pub max_connections: u32,
}

impl Config {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", crate::DEFAULT_PORT)?,
            database_url,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            sweep_interval: Duration::from_secs(parse_nonzero_or(&lookup, "SWEEP_INTERVAL_SECS", 3600)?),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
        })
    }

    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.database_url.clone()).with_max_connections(self.max_connections)
    }

    pub fn expiry_config(&self) -> ExpiryConfig {
        ExpiryConfig {
            interval: self.sweep_interval,
        }
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

fn parse_nonzero_or(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match parse_or(lookup, name, default)? {
        0 => Err(ConfigError::InvalidValue {
            name,
            value: "0".to_string(),
        }),
        n => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "texts.db")])).unwrap();

        assert_eq!(config.database_url, "texts.db");
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert_eq!(config.sweep_interval, Duration::from_secs(3600));
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite:///var/lib/textdrop/texts.db"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("STATIC_DIR", "/srv/www"),
            ("SWEEP_INTERVAL_SECS", "60"),
            ("DB_MAX_CONNECTIONS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.static_dir, PathBuf::from("/srv/www"));
        assert_eq!(config.expiry_config().interval, Duration::from_secs(60));

        let store = config.store_config();
        assert_eq!(store.database_url, "sqlite:///var/lib/textdrop/texts.db");
        assert_eq!(store.max_connections, 2);
    }

    #[test]
    fn test_missing_database_url() {
        assert!(matches!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::MissingDatabaseUrl)
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("DATABASE_URL", "  ")])),
            Err(ConfigError::MissingDatabaseUrl)
        ));
    }

    #[test]
    fn test_invalid_port() {
        let result = Config::from_lookup(lookup(&[("DATABASE_URL", "texts.db"), ("PORT", "http")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: "PORT", .. })
        ));
    }

    #[test]
    fn test_zero_sweep_interval() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "texts.db"),
            ("SWEEP_INTERVAL_SECS", "0"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: "SWEEP_INTERVAL_SECS", .. })
        ));
    }
}
