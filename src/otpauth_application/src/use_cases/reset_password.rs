use chrono::Utc;
use otpauth_core::{
    AccountStore, AccountStoreError, Email, OtpCode, OtpPurpose, Password, PasswordHasher,
    PasswordHasherError, VerificationCodeStore, VerificationCodeStoreError,
};

/// Error types specific to the reset password use case
#[derive(Debug, thiserror::Error)]
pub enum ResetPasswordError {
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
    #[error("Verification code store error: {0}")]
    CodeStoreError(#[from] VerificationCodeStoreError),
    #[error("Password hasher error: {0}")]
    PasswordHasherError(#[from] PasswordHasherError),
    #[error("No pending reset code")]
    NoPendingCode,
    #[error("OTP is not correct")]
    IncorrectOtp,
    #[error("OTP is expired")]
    ExpiredOtp,
}

/// Reset password use case - checks a submitted code against the pending
/// PASSWORD_RESET code and replaces the credential.
///
/// The hash update and code consumption happen in one store transaction.
#[derive(Clone)]
pub struct ResetPasswordUseCase<S, H>
where
    S: AccountStore + VerificationCodeStore,
    H: PasswordHasher,
{
    store: S,
    password_hasher: H,
}

impl<S, H> ResetPasswordUseCase<S, H>
where
    S: AccountStore + VerificationCodeStore,
    H: PasswordHasher,
{
    pub fn new(store: S, password_hasher: H) -> Self {
        Self {
            store,
            password_hasher,
        }
    }

    #[tracing::instrument(name = "ResetPasswordUseCase::execute", skip_all)]
    pub async fn execute(
        &self,
        email: Email,
        new_password: Password,
        submitted: OtpCode,
    ) -> Result<(), ResetPasswordError> {
        let account = self.store.get_account(&email).await?;

        let pending = self
            .store
            .find_pending(account.id, OtpPurpose::PasswordReset)
            .await?
            .ok_or(ResetPasswordError::NoPendingCode)?;

        if pending.code != submitted {
            return Err(ResetPasswordError::IncorrectOtp);
        }
        if pending.is_expired(Utc::now()) {
            return Err(ResetPasswordError::ExpiredOtp);
        }

        let new_hash = self.password_hasher.hash(new_password).await?;
        self.store
            .set_password(account.id, new_hash, pending.id)
            .await?;

        Ok(())
    }
}
