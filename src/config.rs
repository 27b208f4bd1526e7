// Runtime configuration read from the environment (after `.env` is loaded)

use std::time::Duration;
use thiserror::Error;

use crate::search::DEFAULT_SEARCH_LIMIT;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{key} has an invalid value {value:?}: expected {expected}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Connection pool settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    /// Maximum number of hits per search
    pub search_limit: i64,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl AppConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5u32, "a positive integer")?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS",
                value: "0".to_string(),
                expected: "a positive integer",
            });
        }

        let acquire_timeout_secs =
            parse_or(&lookup, "DATABASE_ACQUIRE_TIMEOUT_SECS", 3u64, "a number of seconds")?;

        let search_limit = parse_or(
            &lookup,
            "SEARCH_RESULT_LIMIT",
            DEFAULT_SEARCH_LIMIT,
            "a positive integer",
        )?;
        if search_limit <= 0 {
            return Err(ConfigError::Invalid {
                key: "SEARCH_RESULT_LIMIT",
                value: search_limit.to_string(),
                expected: "a positive integer",
            });
        }

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            database: DatabaseConfig {
                url,
                max_connections,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            },
            search_limit,
            log_level,
        })
    }
}

fn parse_or<F, T>(
    lookup: &F,
    key: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value,
            expected,
        }),
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
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DATABASE_URL", "postgresql://localhost/ryb")]).unwrap();

        assert_eq!(config.database.url, "postgresql://localhost/ryb");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.search_limit, 20);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgresql://localhost/ryb"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("DATABASE_ACQUIRE_TIMEOUT_SECS", " 10 "),
            ("SEARCH_RESULT_LIMIT", "50"),
            ("LOG_LEVEL", "debug"),
        ])
        .unwrap();

        assert_eq!(config.database.max_connections, 12);
        assert_eq!(config.database.acquire_timeout, Duration::from_secs(10));
        assert_eq!(config.search_limit, 50);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_missing_database_url() {
        assert_eq!(config_from(&[]), Err(ConfigError::Missing("DATABASE_URL")));
        assert_eq!(
            config_from(&[("DATABASE_URL", "  ")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
    }

    #[test]
    fn test_invalid_values() {
        let result = config_from(&[
            ("DATABASE_URL", "postgresql://localhost/ryb"),
            ("DATABASE_MAX_CONNECTIONS", "many"),
        ]);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "DATABASE_MAX_CONNECTIONS", .. })
        ));

        let result = config_from(&[
            ("DATABASE_URL", "postgresql://localhost/ryb"),
            ("SEARCH_RESULT_LIMIT", "0"),
        ]);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "SEARCH_RESULT_LIMIT", .. })
        ));
    }
}
