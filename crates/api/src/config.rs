//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use tracify_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:3000", "https://tracify-pro.vercel.app"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// Postgres URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub cors_allowed_origins: Vec<HeaderValue>,
    pub seed_on_startup: bool,
    pub log_format: LogFormat,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the config from an arbitrary variable source.
    ///
    /// Unset and empty variables both fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", e.to_string()))?;

        let database_url = get("DATABASE_URL").map(|v| v.trim().to_string());

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(v) => match v.trim().parse::<u32>() {
                Ok(0) => return Err(ConfigError::invalid("DATABASE_MAX_CONNECTIONS", "must be at least 1")),
                Ok(n) => n,
                Err(e) => return Err(ConfigError::invalid("DATABASE_MAX_CONNECTIONS", e.to_string())),
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let cors_allowed_origins = match get("CORS_ALLOWED_ORIGINS") {
            Some(v) => parse_origins(v.split(','))?,
            None => parse_origins(DEFAULT_CORS_ORIGINS.iter().copied())?,
        };

        let seed_on_startup = match get("SEED_ON_STARTUP") {
            Some(v) => parse_bool(&v).ok_or_else(|| {
                ConfigError::invalid("SEED_ON_STARTUP", format!("expected true or false, got '{v}'"))
            })?,
            None => true,
        };

        let log_format = match get("LOG_FORMAT") {
            Some(v) => v
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid("LOG_FORMAT", e))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            database_url,
            database_max_connections,
            cors_allowed_origins,
            seed_on_startup,
            log_format,
        })
    }
}

fn parse_origins<'a>(raw: impl Iterator<Item = &'a str>) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| {
            if o == "*" {
                return Err(ConfigError::invalid(
                    "CORS_ALLOWED_ORIGINS",
                    "wildcard origin cannot be combined with credentials",
                ));
            }
            HeaderValue::from_str(o)
                .map_err(|e| ConfigError::invalid("CORS_ALLOWED_ORIGINS", format!("'{o}': {e}")))
        })
        .collect()
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
