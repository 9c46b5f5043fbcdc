use std::net::SocketAddr;
use std::str::FromStr;

use chrono::Duration;
use jsonwebtoken::Algorithm;

const DEFAULT_DATABASE_URL: &str = "sqlite:data/notes.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub token_ttl: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing required setting {key}"),
            ConfigError::Invalid { key, value } => write!(f, "invalid value for {key}: {value}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Read settings from the process environment. Call `dotenvy::dotenv()` first
    /// if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => parse("DATABASE_MAX_CONNECTIONS", value)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_addr = parse(
            "BIND_ADDR",
            lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;

        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let algorithm = match lookup("JWT_ALGORITHM") {
            Some(value) => parse_hmac_algorithm(value)?,
            None => Algorithm::HS256,
        };

        let ttl_minutes: i64 = match lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(value) => parse("ACCESS_TOKEN_EXPIRE_MINUTES", value)?,
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };
        let token_ttl = Some(ttl_minutes)
            .filter(|m| (1..=MAX_TOKEN_TTL_MINUTES).contains(m))
            .and_then(Duration::try_minutes)
            .ok_or_else(|| ConfigError::Invalid {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: ttl_minutes.to_string(),
            })?;

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            auth: AuthConfig {
                secret,
                algorithm,
                token_ttl,
            },
        })
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

// Only HMAC algorithms work with a shared secret.
fn parse_hmac_algorithm(value: String) -> Result<Algorithm, ConfigError> {
    match Algorithm::from_str(value.trim()) {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
        _ => Err(ConfigError::Invalid {
            key: "JWT_ALGORITHM",
            value,
        }),
    }
}
