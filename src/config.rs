use std::env;

use crate::error::AppError;

/// Port used when `PORT` is absent or not a valid number.
pub const DEFAULT_PORT: u16 = 7860;
/// The server always listens on every interface.
pub const BIND_HOST: &str = "0.0.0.0";
/// Lifetime of issued tokens when `JWT_EXPIRATION_HOURS` is not set.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Origins allowed to make credentialed cross-origin requests.
pub const ALLOWED_ORIGINS: [&str; 3] = [
    "https://hafizubaid-todo-wep-app.hf.space",
    "http://localhost:3000",
    "http://localhost:7860",
];

/// Process settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Config {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    ///
    /// `DATABASE_URL` and `JWT_SECRET` are required. `PORT` and
    /// `JWT_EXPIRATION_HOURS` fall back to their defaults when missing or
    /// unparsable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = required(&lookup, "DATABASE_URL")?;
        let jwt_secret = required(&lookup, "JWT_SECRET")?;

        Ok(Self {
            database_url,
            server_host: BIND_HOST.to_string(),
            server_port: parse_or_default(lookup("PORT"), "PORT", DEFAULT_PORT),
            jwt_secret,
            token_ttl_hours: parse_or_default(
                lookup("JWT_EXPIRATION_HOURS"),
                "JWT_EXPIRATION_HOURS",
                DEFAULT_TOKEN_TTL_HOURS,
            ),
        })
    }

    pub fn bind_address(&self) -> (&str, u16) {
        (self.server_host.as_str(), self.server_port)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Configuration(format!("{} must be set", key))),
    }
}

fn parse_or_default<T>(raw: Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            log::warn!(
                "{} has invalid value {:?}, falling back to {}",
                key,
                value,
                default
            );
            default
        }),
    }
}
