//! Environment configuration for the server binary.

use std::path::PathBuf;
use std::time::Duration;

use quizhall::DEFAULT_IDLE_TIMEOUT;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is not a valid number: {value:?}")]
    NotANumber { name: &'static str, value: String },
}

/// Settings read from `QUIZHALL_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: String,
    pub jwt_secret: String,
    /// JSON array of quizzes to seed the catalog with.
    pub quiz_file: Option<PathBuf>,
    pub idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("QUIZHALL_JWT_SECRET").ok_or(ConfigError::Missing("QUIZHALL_JWT_SECRET"))?;
        let idle_timeout = match get("QUIZHALL_IDLE_TIMEOUT_SECS") {
            Some(value) => {
                let secs = value.trim().parse().map_err(|_| ConfigError::NotANumber {
                    name: "QUIZHALL_IDLE_TIMEOUT_SECS",
                    value,
                })?;
                Duration::from_secs(secs)
            }
            None => DEFAULT_IDLE_TIMEOUT,
        };

        Ok(Self {
            bind: get("QUIZHALL_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            jwt_secret,
            quiz_file: get("QUIZHALL_QUIZ_FILE").map(PathBuf::from),
            idle_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = config(&[("QUIZHALL_JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.quiz_file, None);
        assert_eq!(config.idle_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_from_lookup_missing_secret_returns_error() {
        assert!(matches!(config(&[]), Err(ConfigError::Missing("QUIZHALL_JWT_SECRET"))));
        assert!(matches!(
            config(&[("QUIZHALL_JWT_SECRET", "  ")]),
            Err(ConfigError::Missing(_))
        ));
    }

    #[test]
    fn test_from_lookup_reads_every_variable() {
        let config = config(&[
            ("QUIZHALL_JWT_SECRET", "s3cret"),
            ("QUIZHALL_BIND", "127.0.0.1:9000"),
            ("QUIZHALL_QUIZ_FILE", "quizzes.json"),
            ("QUIZHALL_IDLE_TIMEOUT_SECS", "30"),
        ])
        .unwrap();
        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.quiz_file, Some(PathBuf::from("quizzes.json")));
        assert_eq!(config.idle_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_lookup_bad_timeout_returns_error() {
        let err = config(&[
            ("QUIZHALL_JWT_SECRET", "s3cret"),
            ("QUIZHALL_IDLE_TIMEOUT_SECS", "soon"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("soon"));
    }
}
