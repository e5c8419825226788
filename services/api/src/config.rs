//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use study_core::ProgressConfig;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// When absent the service keeps records in memory only.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub default_user_id: String,
    pub cors_origin: String,
    pub progress: ProgressConfig,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let default_user_id =
            lookup("DEFAULT_USER_ID").unwrap_or_else(|| "default-user".to_string());
        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Progress Classification Thresholds ---
        let defaults = ProgressConfig::default();
        let progress = ProgressConfig {
            minimum_questions_for_accuracy: parse_or(
                &lookup,
                "PROGRESS_MIN_QUESTIONS",
                defaults.minimum_questions_for_accuracy,
            )?,
            mastery_threshold: parse_or(
                &lookup,
                "PROGRESS_MASTERY_THRESHOLD",
                defaults.mastery_threshold,
            )?,
            review_threshold: parse_or(
                &lookup,
                "PROGRESS_REVIEW_THRESHOLD",
                defaults.review_threshold,
            )?,
        };
        if progress.review_threshold > progress.mastery_threshold {
            return Err(ConfigError::InvalidValue(
                "PROGRESS_REVIEW_THRESHOLD".to_string(),
                "must not exceed PROGRESS_MASTERY_THRESHOLD".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            default_user_id,
            cors_origin,
            progress,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert!(config.database_url.is_none());
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.default_user_id, "default-user");
        assert_eq!(config.progress, ProgressConfig::default());
    }

    #[test]
    fn thresholds_can_be_overridden() {
        let config = load(&[
            ("PROGRESS_MIN_QUESTIONS", "3"),
            ("PROGRESS_MASTERY_THRESHOLD", "90"),
            ("PROGRESS_REVIEW_THRESHOLD", "50.5"),
            ("DATABASE_URL", "postgres://localhost/study"),
        ])
        .unwrap();
        assert_eq!(config.progress.minimum_questions_for_accuracy, 3);
        assert_eq!(config.progress.mastery_threshold, 90.0);
        assert_eq!(config.progress.review_threshold, 50.5);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/study"));
    }

    #[test]
    fn bad_values_are_reported_by_name() {
        let err = load(&[("PROGRESS_MIN_QUESTIONS", "five")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "PROGRESS_MIN_QUESTIONS"));

        let err = load(&[("BIND_ADDRESS", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "BIND_ADDRESS"));

        let err = load(&[("PROGRESS_REVIEW_THRESHOLD", "95")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "PROGRESS_REVIEW_THRESHOLD"));
    }
}
