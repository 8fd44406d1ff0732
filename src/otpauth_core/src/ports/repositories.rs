use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::Secret;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    account::Account,
    email::Email,
    otp::{OtpCode, OtpPurpose},
    session_token::SessionToken,
    verification::VerificationCode,
};

// AccountStore port trait and errors
#[derive(Debug, Error)]
pub enum AccountStoreError {
    #[error("Account already exists")]
    AccountAlreadyExists,
    #[error("Account not found")]
    AccountNotFound,
    #[error("Verification code value collides with a live code")]
    CodeCollision,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl PartialEq for AccountStoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::AccountAlreadyExists, Self::AccountAlreadyExists) => true,
            (Self::AccountNotFound, Self::AccountNotFound) => true,
            (Self::CodeCollision, Self::CodeCollision) => true,
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
            _ => false,
        }
    }
}

/// Store for the root `Account` entity.
///
/// The two-step transitions (activate + consume code, set password + consume
/// code) are exposed as single operations so an implementation can apply them
/// in one transaction; callers must never be able to observe one half
/// without the other.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new inactive account together with its initial verification
    /// code as one atomic unit.
    async fn add_account(
        &self,
        account: Account,
        code: VerificationCode,
    ) -> Result<(), AccountStoreError>;

    async fn get_account(&self, email: &Email) -> Result<Account, AccountStoreError>;

    /// Delete the account; owned verification codes and session tokens are
    /// removed with it.
    async fn delete_account(&self, id: Uuid) -> Result<(), AccountStoreError>;

    /// Set `activated = true` and delete the verification code identified by
    /// `code_id` in the same transaction.
    async fn activate_account(&self, id: Uuid, code_id: Uuid) -> Result<(), AccountStoreError>;

    /// Replace the password hash and delete the verification code identified
    /// by `code_id` in the same transaction.
    async fn set_password(
        &self,
        id: Uuid,
        new_password_hash: Secret<String>,
        code_id: Uuid,
    ) -> Result<(), AccountStoreError>;
}

// VerificationCodeStore port trait and errors
#[derive(Debug, Error)]
pub enum VerificationCodeStoreError {
    #[error("Verification code value collides with a live code")]
    CodeCollision,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl PartialEq for VerificationCodeStoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::CodeCollision, Self::CodeCollision) => true,
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
            _ => false,
        }
    }
}

#[async_trait]
pub trait VerificationCodeStore: Send + Sync {
    /// Look a code value up across all accounts and purposes. Used by the
    /// generator to enforce system-wide uniqueness of live codes.
    async fn find_by_code(
        &self,
        code: &OtpCode,
    ) -> Result<Option<VerificationCode>, VerificationCodeStoreError>;

    async fn find_pending(
        &self,
        account_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<Option<VerificationCode>, VerificationCodeStoreError>;

    /// Rotation primitive: replace any existing row for this
    /// (account, purpose) pair with the new code and expiry.
    async fn upsert(
        &self,
        account_id: Uuid,
        purpose: OtpPurpose,
        code: OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), VerificationCodeStoreError>;
}

// SessionTokenStore port trait and errors
#[derive(Debug, Error)]
pub enum SessionTokenStoreError {
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

#[async_trait]
pub trait SessionTokenStore: Send + Sync {
    async fn add_token(&self, token: SessionToken) -> Result<(), SessionTokenStoreError>;
}
