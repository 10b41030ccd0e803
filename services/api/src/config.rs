//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub ai_api_key: Option<String>,
    /// Overrides the OpenAI endpoint, e.g. with Gemini's OpenAI-compatible one.
    pub ai_api_base: Option<String>,
    pub ai_model: String,
    pub ai_timeout: Duration,
    pub cors_origin: HeaderValue,
    pub session_ttl_hours: i64,
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

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load AI Settings (the key is checked by the binary) ---
        let ai_api_key = std::env::var("AI_API_KEY").ok();
        let ai_api_base = std::env::var("AI_API_BASE").ok();
        let ai_model =
            std::env::var("AI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash-lite".to_string());
        let ai_timeout = Duration::from_secs(parse_var("AI_TIMEOUT_SECS", 60)?);

        // --- Load Web Settings ---
        let cors_origin_str =
            std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let cors_origin = cors_origin_str.parse::<HeaderValue>().map_err(|e| {
            ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
        })?;
        let session_ttl_hours = check_session_ttl(parse_var("SESSION_TTL_HOURS", 24)?)?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            ai_api_key,
            ai_api_base,
            ai_model,
            ai_timeout,
            cors_origin,
            session_ttl_hours,
        })
    }
}

/// Sessions last between one hour and one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

fn check_session_ttl(hours: i64) -> Result<i64, ConfigError> {
    if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(ConfigError::InvalidValue(
            "SESSION_TTL_HOURS".to_string(),
            format!("{} is outside 1..={}", hours, MAX_SESSION_TTL_HOURS),
        ))
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
