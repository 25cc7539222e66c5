use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    /// Access tokens carry the role and are not re-checked against the
    /// database, so a demotion or deactivation bites at the latest when the
    /// current access token expires; refresh always re-reads the user.
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub db_max_connections: u32,
    pub log_dir: String,

    /// Paid leave days granted to a new user when none is given
    pub default_annual_leave: i32,
    /// Number of entries returned by the attendance history
    pub history_limit: u32,

    /// First admin account, created at start-up when no admin exists
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn parsed_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parsed_or("ACCESS_TOKEN_TTL", 900)?, // 15 min
            refresh_token_ttl: parsed_or("REFRESH_TOKEN_TTL", 604_800)?, // 7 days

            rate_login_per_min: parsed_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_refresh_per_min: parsed_or("RATE_REFRESH_PER_MIN", 30)?,
            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            db_max_connections: parsed_or("DB_MAX_CONNECTIONS", 10)?,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            default_annual_leave: parsed_or("DEFAULT_ANNUAL_LEAVE", 20)?,
            history_limit: parsed_or("HISTORY_LIMIT", 20)?,

            admin_email: env::var("ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
        })
    }
}
