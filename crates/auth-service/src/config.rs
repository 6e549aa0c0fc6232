use base64::{engine::general_purpose, Engine as _};
use common::secret::{ExposeSecret, SecretBox};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Minimum decoded length of the token signing secret.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8001";

/// Access tokens live 15 minutes by default.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 900;
pub const MIN_ACCESS_TOKEN_TTL_SECONDS: i64 = 60;
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;

/// Refresh tokens live 7 days by default.
pub const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 3600;
pub const MAX_REFRESH_TOKEN_TTL_SECONDS: i64 = 90 * 24 * 3600;

pub const DEFAULT_BCRYPT_COST: u32 = 12;
pub const MIN_BCRYPT_COST: u32 = 10;
pub const MAX_BCRYPT_COST: u32 = 14;

pub const DEFAULT_REVOCATION_SWEEP_INTERVAL_SECONDS: u64 = 3600;

pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// HS256 signing secret shared with downstream verifiers.
    pub jwt_secret: SecretBox<Vec<u8>>,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    pub bcrypt_cost: u32,
    /// Mark the refresh cookie `Secure`. Disable only for local plain-http runs.
    pub secure_cookies: bool,
    pub cors_origins: Vec<String>,
    /// Seconds between revocation sweeps. 0 disables the sweep.
    pub revocation_sweep_interval_seconds: u64,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            database_url: self.database_url.clone(),
            bind_address: self.bind_address.clone(),
            jwt_secret: SecretBox::new(Box::new(self.jwt_secret.expose_secret().clone())),
            access_token_ttl_seconds: self.access_token_ttl_seconds,
            refresh_token_ttl_seconds: self.refresh_token_ttl_seconds,
            bcrypt_cost: self.bcrypt_cost,
            secure_cookies: self.secure_cookies,
            cors_origins: self.cors_origins.clone(),
            revocation_sweep_interval_seconds: self.revocation_sweep_interval_seconds,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("secure_cookies", &self.secure_cookies)
            .field("cors_origins", &self.cors_origins)
            .field(
                "revocation_sweep_interval_seconds",
                &self.revocation_sweep_interval_seconds,
            )
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let secret_base64 = vars
            .get("AUTH_JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("AUTH_JWT_SECRET".to_string()))?;

        let jwt_secret = general_purpose::STANDARD
            .decode(secret_base64.trim())
            .map_err(ConfigError::Base64Error)?;

        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "Expected at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                jwt_secret.len()
            )));
        }

        let access_token_ttl_seconds = parse_or_default(
            vars,
            "ACCESS_TOKEN_TTL_SECONDS",
            DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
        )?;
        if !(MIN_ACCESS_TOKEN_TTL_SECONDS..=MAX_ACCESS_TOKEN_TTL_SECONDS)
            .contains(&access_token_ttl_seconds)
        {
            return Err(invalid(
                "ACCESS_TOKEN_TTL_SECONDS",
                format!(
                    "must be between {} and {}",
                    MIN_ACCESS_TOKEN_TTL_SECONDS, MAX_ACCESS_TOKEN_TTL_SECONDS
                ),
            ));
        }

        let refresh_token_ttl_seconds = parse_or_default(
            vars,
            "REFRESH_TOKEN_TTL_SECONDS",
            DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
        )?;
        if refresh_token_ttl_seconds <= access_token_ttl_seconds
            || refresh_token_ttl_seconds > MAX_REFRESH_TOKEN_TTL_SECONDS
        {
            return Err(invalid(
                "REFRESH_TOKEN_TTL_SECONDS",
                format!(
                    "must exceed the access token TTL and be at most {}",
                    MAX_REFRESH_TOKEN_TTL_SECONDS
                ),
            ));
        }

        let bcrypt_cost = parse_or_default(vars, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(invalid(
                "BCRYPT_COST",
                format!("must be between {} and {}", MIN_BCRYPT_COST, MAX_BCRYPT_COST),
            ));
        }

        let secure_cookies = parse_or_default(vars, "SECURE_COOKIES", true)?;

        let cors_origins: Vec<String> = vars
            .get("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();
        // Credentialed CORS cannot use a wildcard origin
        if cors_origins.iter().any(|origin| origin == "*") {
            return Err(invalid(
                "CORS_ORIGINS",
                "wildcard origin is not allowed with credentials; list origins explicitly"
                    .to_string(),
            ));
        }

        let revocation_sweep_interval_seconds = parse_or_default(
            vars,
            "REVOCATION_SWEEP_INTERVAL_SECONDS",
            DEFAULT_REVOCATION_SWEEP_INTERVAL_SECONDS,
        )?;

        Ok(Config {
            database_url,
            bind_address,
            jwt_secret: SecretBox::new(Box::new(jwt_secret)),
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            bcrypt_cost,
            secure_cookies,
            cors_origins,
            revocation_sweep_interval_seconds,
        })
    }
}

fn parse_or_default<T>(
    vars: &HashMap<String, String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match vars.get(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| invalid(name, e.to_string())),
        None => Ok(default),
    }
}

fn invalid(name: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        reason,
    }
}
