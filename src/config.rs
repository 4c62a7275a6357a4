use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const HTTP_ADDR_VAR: &str = "TASK_TRACKER_HTTP_ADDR";
pub const DATABASE_VAR: &str = "TASK_TRACKER_DATABASE";
pub const JWT_SECRET_VAR: &str = "TASK_TRACKER_JWT_SECRET";
pub const TOKEN_TTL_VAR: &str = "TASK_TRACKER_TOKEN_TTL_HOURS";

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATABASE: &str = "task_tracker.db";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::Invalid { key, message } => write!(f, "invalid {key}: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct TrackerConfig {
    pub http_addr: SocketAddr,
    pub database_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("http_addr", &self.http_addr)
            .field("database_path", &self.database_path)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

impl TrackerConfig {
    /// Reads the process environment, after loading a `.env` file if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_addr = lookup(HTTP_ADDR_VAR)
            .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::Invalid {
                key: HTTP_ADDR_VAR,
                message: err.to_string(),
            })?;

        let database_path = lookup(DATABASE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));

        let jwt_secret = lookup(JWT_SECRET_VAR)
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(ConfigError::Missing(JWT_SECRET_VAR))?;

        let token_ttl_hours = match lookup(TOKEN_TTL_VAR) {
            Some(raw) => parse_ttl(&raw)?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        Ok(Self {
            http_addr,
            database_path,
            jwt_secret,
            token_ttl_hours,
        })
    }
}

fn parse_ttl(raw: &str) -> Result<i64, ConfigError> {
    let hours = raw.trim().parse::<i64>().map_err(|err| ConfigError::Invalid {
        key: TOKEN_TTL_VAR,
        message: err.to_string(),
    })?;
    if hours <= 0 || hours > MAX_TOKEN_TTL_HOURS {
        return Err(ConfigError::Invalid {
            key: TOKEN_TTL_VAR,
            message: format!("must be between 1 and {MAX_TOKEN_TTL_HOURS} (got {hours})"),
        });
    }
    Ok(hours)
}
