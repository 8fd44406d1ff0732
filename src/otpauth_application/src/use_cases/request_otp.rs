use chrono::{Duration, Utc};
use otpauth_core::{
    AccountStore, AccountStoreError, Email, EmailClient, OtpEmail, OtpPurpose,
    VerificationCodeStore, VerificationCodeStoreError,
};

use crate::otp_generator::{OtpGenerator, OtpGeneratorError};

/// Error types specific to the request OTP use case
#[derive(Debug, thiserror::Error)]
pub enum RequestOtpError {
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
    #[error("Verification code store error: {0}")]
    CodeStoreError(#[from] VerificationCodeStoreError),
    #[error("OTP generator error: {0}")]
    OtpGeneratorError(#[from] OtpGeneratorError),
    #[error("Failed to send email: {0}")]
    EmailError(String),
}

/// Request OTP use case - rotates the pending code for a (account, purpose)
/// pair and delivers the fresh value.
///
/// Serves both "resend verification code" and "request password reset".
/// Unlike registration, a delivery failure here does not roll the rotation
/// back: the rotated code stays pending and the caller simply retries.
#[derive(Clone)]
pub struct RequestOtpUseCase<S, E>
where
    S: AccountStore + VerificationCodeStore,
    E: EmailClient,
{
    store: S,
    email_client: E,
    otp_generator: OtpGenerator,
    otp_ttl: Duration,
}

impl<S, E> RequestOtpUseCase<S, E>
where
    S: AccountStore + VerificationCodeStore,
    E: EmailClient,
{
    pub fn new(store: S, email_client: E, otp_generator: OtpGenerator, otp_ttl: Duration) -> Self {
        Self {
            store,
            email_client,
            otp_generator,
            otp_ttl,
        }
    }

    #[tracing::instrument(name = "RequestOtpUseCase::execute", skip(self, email))]
    pub async fn execute(&self, email: Email, purpose: OtpPurpose) -> Result<(), RequestOtpError> {
        let account = self.store.get_account(&email).await?;
        let expires_at = Utc::now() + self.otp_ttl;

        let code = self.rotate_code(account.id, purpose, expires_at).await?;

        let otp_email = OtpEmail {
            full_name: account.full_name.clone(),
            code,
            expires_at,
        };

        self.email_client
            .send_otp_email(&account.email, &otp_email)
            .await
            .map_err(RequestOtpError::EmailError)?;

        Ok(())
    }

    async fn rotate_code(
        &self,
        account_id: uuid::Uuid,
        purpose: OtpPurpose,
        expires_at: chrono::DateTime<Utc>,
    ) -> Result<otpauth_core::OtpCode, RequestOtpError> {
        for _ in 0..self.otp_generator.max_attempts() {
            let code = self.otp_generator.generate_unique(&self.store).await?;
            match self
                .store
                .upsert(account_id, purpose, code.clone(), expires_at)
                .await
            {
                Ok(()) => return Ok(code),
                Err(VerificationCodeStoreError::CodeCollision) => continue,
                Err(other) => return Err(other.into()),
            }
        }

        Err(OtpGeneratorError::ExhaustedRetries(self.otp_generator.max_attempts()).into())
    }
}

#[cfg(test)]
mod tests {
    use otpauth_adapters::email::MockEmailClient;
    use otpauth_adapters::persistence::InMemoryAuthStore;

    use super::*;
    use crate::use_cases::test_support::{account, email};

    fn use_case(
        store: InMemoryAuthStore,
        email_client: MockEmailClient,
    ) -> RequestOtpUseCase<InMemoryAuthStore, MockEmailClient> {
        RequestOtpUseCase::new(
            store,
            email_client,
            OtpGenerator::default(),
            Duration::minutes(3),
        )
    }

    #[tokio::test]
    async fn issues_and_delivers_a_pending_code() {
        let store = InMemoryAuthStore::default();
        let alice = account("alice@example.com", "P@ssw0rd!");
        let alice_id = alice.id;
        store.seed_account(alice);
        let email_client = MockEmailClient::default();
        let use_case = use_case(store.clone(), email_client.clone());

        use_case
            .execute(email("alice@example.com"), OtpPurpose::PasswordReset)
            .await
            .unwrap();

        let pending = store
            .find_pending(alice_id, OtpPurpose::PasswordReset)
            .await
            .unwrap()
            .expect("a reset code should be pending");
        assert_eq!(email_client.last_code(), Some(pending.code));
    }

    #[tokio::test]
    async fn a_second_request_supersedes_the_first_code() {
        let store = InMemoryAuthStore::default();
        let alice = account("alice@example.com", "P@ssw0rd!");
        let alice_id = alice.id;
        store.seed_account(alice);
        let email_client = MockEmailClient::default();
        let use_case = use_case(store.clone(), email_client.clone());

        use_case
            .execute(email("alice@example.com"), OtpPurpose::AccountVerification)
            .await
            .unwrap();
        let first = email_client.last_code().unwrap();

        use_case
            .execute(email("alice@example.com"), OtpPurpose::AccountVerification)
            .await
            .unwrap();
        let second = email_client.last_code().unwrap();

        let pending = store
            .find_pending(alice_id, OtpPurpose::AccountVerification)
            .await
            .unwrap()
            .expect("exactly one code should remain pending");
        assert_eq!(pending.code, second);
        assert!(store.find_by_code(&first).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_accounts_are_reported_as_not_found() {
        let use_case = use_case(InMemoryAuthStore::default(), MockEmailClient::default());

        let result = use_case
            .execute(email("ghost@example.com"), OtpPurpose::PasswordReset)
            .await;
        assert!(matches!(
            result,
            Err(RequestOtpError::AccountStoreError(
                AccountStoreError::AccountNotFound
            ))
        ));
    }

    #[tokio::test]
    async fn delivery_failure_keeps_the_rotated_code() {
        let store = InMemoryAuthStore::default();
        let alice = account("alice@example.com", "P@ssw0rd!");
        let alice_id = alice.id;
        store.seed_account(alice);
        let email_client = MockEmailClient::default();
        email_client.set_failing(true);
        let use_case = use_case(store.clone(), email_client);

        let result = use_case
            .execute(email("alice@example.com"), OtpPurpose::PasswordReset)
            .await;

        assert!(matches!(result, Err(RequestOtpError::EmailError(_))));
        // Rotation is not compensated on this path.
        assert!(
            store
                .find_pending(alice_id, OtpPurpose::PasswordReset)
                .await
                .unwrap()
                .is_some()
        );
    }
}
