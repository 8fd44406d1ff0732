use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::Secret;
use thiserror::Error;

use crate::domain::{
    account::Account, email::Email, full_name::FullName, otp::OtpCode, password::Password,
    session_token::SessionToken,
};

/// Template variables for the outbound OTP message.
#[derive(Debug, Clone)]
pub struct OtpEmail {
    pub full_name: FullName,
    pub code: OtpCode,
    pub expires_at: DateTime<Utc>,
}

/// Notification gateway for delivering one-time codes.
#[async_trait]
pub trait EmailClient: Send + Sync {
    async fn send_otp_email(&self, recipient: &Email, email: &OtpEmail) -> Result<(), String>;
}

// PasswordHasher port trait and errors
#[derive(Debug, Error)]
pub enum PasswordHasherError {
    #[error("Incorrect password")]
    IncorrectPassword,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// One-way credential hashing and verification.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: Password) -> Result<Secret<String>, PasswordHasherError>;

    async fn verify(
        &self,
        expected_hash: Secret<String>,
        candidate: Password,
    ) -> Result<(), PasswordHasherError>;
}

// TokenIssuer port trait and errors
#[derive(Debug, Error)]
pub enum TokenIssuerError {
    #[error("Token error: {0}")]
    TokenError(String),
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Mints signed access and refresh tokens bound to an account.
pub trait TokenIssuer: Send + Sync {
    /// Short-lived token carrying id, email and role claims.
    fn issue_access_token(&self, account: &Account) -> Result<String, TokenIssuerError>;

    /// Long-lived token carrying only the subject id, returned together with
    /// the expiry under which it is persisted.
    fn issue_refresh_token(&self, account: &Account) -> Result<SessionToken, TokenIssuerError>;
}
