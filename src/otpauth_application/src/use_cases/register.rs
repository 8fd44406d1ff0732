use chrono::{Duration, Utc};
use otpauth_core::{
    Account, AccountRole, AccountStore, AccountStoreError, Email, EmailClient, FullName, OtpEmail,
    OtpPurpose, Password, PasswordHasher, PasswordHasherError, VerificationCode,
    VerificationCodeStore,
};

use crate::otp_generator::{OtpGenerator, OtpGeneratorError};

/// Error types specific to the register use case
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
    #[error("Password hasher error: {0}")]
    PasswordHasherError(#[from] PasswordHasherError),
    #[error("OTP generator error: {0}")]
    OtpGeneratorError(#[from] OtpGeneratorError),
    #[error("Failed to send email: {0}")]
    EmailError(String),
}

/// Register use case - creates an inactive account, issues its verification
/// code and delivers it.
///
/// If delivery fails the freshly created account is deleted again (the code
/// goes with it) and the delivery error is re-raised, so registration never
/// leaves an account nobody can verify.
#[derive(Clone)]
pub struct RegisterUseCase<S, H, E>
where
    S: AccountStore + VerificationCodeStore,
    H: PasswordHasher,
    E: EmailClient,
{
    store: S,
    password_hasher: H,
    email_client: E,
    otp_generator: OtpGenerator,
    otp_ttl: Duration,
}

impl<S, H, E> RegisterUseCase<S, H, E>
where
    S: AccountStore + VerificationCodeStore,
    H: PasswordHasher,
    E: EmailClient,
{
    pub fn new(
        store: S,
        password_hasher: H,
        email_client: E,
        otp_generator: OtpGenerator,
        otp_ttl: Duration,
    ) -> Self {
        Self {
            store,
            password_hasher,
            email_client,
            otp_generator,
            otp_ttl,
        }
    }

    #[tracing::instrument(name = "RegisterUseCase::execute", skip_all)]
    pub async fn execute(
        &self,
        full_name: FullName,
        email: Email,
        password: Password,
        role: Option<AccountRole>,
    ) -> Result<(), RegisterError> {
        let password_hash = self.password_hasher.hash(password).await?;
        let account = Account::new(email, full_name, password_hash, role.unwrap_or_default());
        let expires_at = Utc::now() + self.otp_ttl;

        let verification = self.create_with_unique_code(&account, expires_at).await?;

        let otp_email = OtpEmail {
            full_name: account.full_name.clone(),
            code: verification.code,
            expires_at,
        };

        if let Err(delivery_err) = self
            .email_client
            .send_otp_email(&account.email, &otp_email)
            .await
        {
            if let Err(cleanup_err) = self.store.delete_account(account.id).await {
                tracing::error!(
                    %cleanup_err,
                    "failed to remove account after undeliverable verification email"
                );
            }
            return Err(RegisterError::EmailError(delivery_err));
        }

        Ok(())
    }

    /// Insert the account together with a globally unique verification code.
    ///
    /// The store's unique index on code values can still reject a candidate
    /// that passed the generator's lookup; those collisions are retried under
    /// the same attempt cap.
    async fn create_with_unique_code(
        &self,
        account: &Account,
        expires_at: chrono::DateTime<Utc>,
    ) -> Result<VerificationCode, RegisterError> {
        for _ in 0..self.otp_generator.max_attempts() {
            let code = self.otp_generator.generate_unique(&self.store).await?;
            let verification = VerificationCode::new(
                account.id,
                OtpPurpose::AccountVerification,
                code,
                expires_at,
            );

            match self
                .store
                .add_account(account.clone(), verification.clone())
                .await
            {
                Ok(()) => return Ok(verification),
                Err(AccountStoreError::CodeCollision) => continue,
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
    use crate::use_cases::test_support::{FakeHasher, account, email, full_name, password};

    fn use_case(
        store: InMemoryAuthStore,
        email_client: MockEmailClient,
    ) -> RegisterUseCase<InMemoryAuthStore, FakeHasher, MockEmailClient> {
        RegisterUseCase::new(
            store,
            FakeHasher,
            email_client,
            OtpGenerator::default(),
            Duration::minutes(3),
        )
    }

    #[tokio::test]
    async fn creates_an_inactive_account_and_emails_the_code() {
        let store = InMemoryAuthStore::default();
        let email_client = MockEmailClient::default();
        let use_case = use_case(store.clone(), email_client.clone());

        use_case
            .execute(
                full_name("Alice"),
                email("alice@example.com"),
                password("P@ssw0rd!"),
                None,
            )
            .await
            .unwrap();

        let stored = store.get_account(&email("alice@example.com")).await.unwrap();
        assert!(!stored.activated);
        assert_eq!(stored.role, AccountRole::User);

        let pending = store
            .find_pending(stored.id, OtpPurpose::AccountVerification)
            .await
            .unwrap()
            .expect("verification code should be pending");

        let delivered = email_client.last_code().expect("one email should be sent");
        assert_eq!(pending.code, delivered);
    }

    #[tokio::test]
    async fn honors_the_requested_role() {
        let store = InMemoryAuthStore::default();
        let use_case = use_case(store.clone(), MockEmailClient::default());

        use_case
            .execute(
                full_name("Root"),
                email("admin@example.com"),
                password("P@ssw0rd!"),
                Some(AccountRole::Admin),
            )
            .await
            .unwrap();

        let stored = store.get_account(&email("admin@example.com")).await.unwrap();
        assert_eq!(stored.role, AccountRole::Admin);
    }

    #[tokio::test]
    async fn rejects_duplicate_emails() {
        let store = InMemoryAuthStore::default();
        store.seed_account(account("alice@example.com", "P@ssw0rd!"));
        let use_case = use_case(store, MockEmailClient::default());

        let result = use_case
            .execute(
                full_name("Alice Again"),
                email("alice@example.com"),
                password("0therP@ss!"),
                None,
            )
            .await;

        assert!(matches!(
            result,
            Err(RegisterError::AccountStoreError(
                AccountStoreError::AccountAlreadyExists
            ))
        ));
    }

    #[tokio::test]
    async fn removes_the_account_when_delivery_fails() {
        let store = InMemoryAuthStore::default();
        let email_client = MockEmailClient::default();
        email_client.set_failing(true);
        let use_case = use_case(store.clone(), email_client);

        let result = use_case
            .execute(
                full_name("Alice"),
                email("alice@example.com"),
                password("P@ssw0rd!"),
                None,
            )
            .await;

        assert!(matches!(result, Err(RegisterError::EmailError(_))));
        assert!(matches!(
            store.get_account(&email("alice@example.com")).await,
            Err(AccountStoreError::AccountNotFound)
        ));
    }
}
