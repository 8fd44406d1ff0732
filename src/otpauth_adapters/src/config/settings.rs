use secrecy::Secret;
use thiserror::Error;

use crate::config::constants::{env, prod};
use crate::hashing::HashingParams;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Could not parse environment variable {0}: {1}")]
    InvalidVar(&'static str, String),
}

/// Everything the service reads from the environment, collected once at
/// startup. Call sites take values from here instead of `std::env`.
#[derive(Clone)]
pub struct AuthSettings {
    pub app_address: String,
    pub database_url: Secret<String>,
    pub access_token_secret: Secret<String>,
    pub refresh_token_secret: Secret<String>,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_days: i64,
    pub otp_ttl_minutes: i64,
    /// UTC offset, in minutes, used when formatting code expiry times in
    /// outbound emails.
    pub otp_display_offset_minutes: i32,
    pub hashing: HashingParams,
    pub postmark_auth_token: Secret<String>,
    pub email_sender: String,
    pub allowed_origins: Vec<String>,
}

impl AuthSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let defaults = HashingParams::default();

        Ok(AuthSettings {
            app_address: optional(env::APP_ADDRESS_ENV_VAR)
                .unwrap_or_else(|| prod::APP_ADDRESS.to_string()),
            database_url: Secret::from(required(env::DATABASE_URL_ENV_VAR)?),
            access_token_secret: Secret::from(required(env::ACCESS_TOKEN_SECRET_ENV_VAR)?),
            refresh_token_secret: Secret::from(required(env::REFRESH_TOKEN_SECRET_ENV_VAR)?),
            access_token_ttl_seconds: parsed(env::ACCESS_TOKEN_TTL_SECONDS_ENV_VAR, 600)?,
            refresh_token_ttl_days: parsed(env::REFRESH_TOKEN_TTL_DAYS_ENV_VAR, 365)?,
            otp_ttl_minutes: parsed(env::OTP_TTL_MINUTES_ENV_VAR, 3)?,
            otp_display_offset_minutes: parsed(env::OTP_DISPLAY_OFFSET_MINUTES_ENV_VAR, 0)?,
            hashing: HashingParams {
                memory_kib: parsed(env::ARGON2_MEMORY_KIB_ENV_VAR, defaults.memory_kib)?,
                iterations: parsed(env::ARGON2_ITERATIONS_ENV_VAR, defaults.iterations)?,
                parallelism: parsed(env::ARGON2_PARALLELISM_ENV_VAR, defaults.parallelism)?,
            },
            postmark_auth_token: Secret::from(required(env::POSTMARK_AUTH_TOKEN_ENV_VAR)?),
            email_sender: required(env::EMAIL_SENDER_ENV_VAR)?,
            allowed_origins: optional(env::ALLOWED_ORIGINS_ENV_VAR)
                .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default(),
        })
    }
}

fn required(name: &'static str) -> Result<String, SettingsError> {
    std::env::var(name).map_err(|_| SettingsError::MissingVar(name))
}

fn optional(name: &'static str) -> Option<String> {
    std::env::var(name).ok()
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, SettingsError>
where
    T::Err: std::fmt::Display,
{
    match optional(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| SettingsError::InvalidVar(name, e.to_string())),
        None => Ok(default),
    }
}
