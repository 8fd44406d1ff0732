use chrono::Utc;
use otpauth_core::{
    AccountStore, AccountStoreError, Email, OtpCode, OtpPurpose, VerificationCodeStore,
    VerificationCodeStoreError,
};

/// Error types specific to the verify account use case
#[derive(Debug, thiserror::Error)]
pub enum VerifyAccountError {
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
    #[error("Verification code store error: {0}")]
    CodeStoreError(#[from] VerificationCodeStoreError),
    #[error("No pending verification code")]
    NoPendingCode,
    #[error("OTP is not correct")]
    IncorrectOtp,
    #[error("OTP is expired")]
    ExpiredOtp,
}

/// Verify account use case - checks a submitted code against the pending
/// ACCOUNT_VERIFICATION code and activates the account.
///
/// Activation and code consumption happen in one store transaction; there is
/// no observable state where only one of the two applied.
#[derive(Clone)]
pub struct VerifyAccountUseCase<S>
where
    S: AccountStore + VerificationCodeStore,
{
    store: S,
}

impl<S> VerifyAccountUseCase<S>
where
    S: AccountStore + VerificationCodeStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(name = "VerifyAccountUseCase::execute", skip_all)]
    pub async fn execute(&self, email: Email, submitted: OtpCode) -> Result<(), VerifyAccountError> {
        let account = self.store.get_account(&email).await?;

        let pending = self
            .store
            .find_pending(account.id, OtpPurpose::AccountVerification)
            .await?
            .ok_or(VerifyAccountError::NoPendingCode)?;

        if pending.code != submitted {
            return Err(VerifyAccountError::IncorrectOtp);
        }
        if pending.is_expired(Utc::now()) {
            return Err(VerifyAccountError::ExpiredOtp);
        }

        self.store.activate_account(account.id, pending.id).await?;

        Ok(())
    }
}
