use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::auth::token::DEFAULT_TOKEN_TTL_HOURS;
use crate::usecases::DEFAULT_TIMEOUT;

/// Upper bound for `REQUEST_TIMEOUT_SECS` (one day).
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 24 * 60 * 60;
/// Upper bound for `TOKEN_TTL_HOURS` (one year).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub request_timeout: Duration,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let token_ttl_hours = parse_or(&lookup, "TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        let token_ttl = Some(token_ttl_hours)
            .filter(|hours| (1..=MAX_TOKEN_TTL_HOURS).contains(hours))
            .and_then(chrono::Duration::try_hours)
            .ok_or_else(|| ConfigError::Invalid {
                name: "TOKEN_TTL_HOURS",
                value: token_ttl_hours.to_string(),
            })?;

        let timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT.as_secs())?;
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&timeout_secs) {
            return Err(ConfigError::Invalid {
                name: "REQUEST_TIMEOUT_SECS",
                value: timeout_secs.to_string(),
            });
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            request_timeout: Duration::from_secs(timeout_secs),
            token_ttl,
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
