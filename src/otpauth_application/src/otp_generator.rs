use otpauth_core::{OtpCode, VerificationCodeStore, VerificationCodeStoreError};

/// How many candidate codes are drawn before giving up. Ten attempts against
/// a million-value space keeps the failure probability negligible at the
/// issuance rates this service sees, while still failing loudly instead of
/// spinning forever under pathological load.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum OtpGeneratorError {
    #[error("No free code value found after {0} attempts")]
    ExhaustedRetries(u32),
    #[error("Verification code store error: {0}")]
    StoreError(#[from] VerificationCodeStoreError),
}

/// Draws six-digit codes and guarantees the returned value does not collide
/// with any currently-live verification code.
///
/// The store-side unique index backstops the window between the lookup here
/// and the eventual insert; callers retry on `CodeCollision` with the same
/// attempt cap.
#[derive(Debug, Clone)]
pub struct OtpGenerator {
    max_attempts: u32,
}

impl Default for OtpGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl OtpGenerator {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[tracing::instrument(name = "OtpGenerator::generate_unique", skip_all)]
    pub async fn generate_unique<S>(&self, store: &S) -> Result<OtpCode, OtpGeneratorError>
    where
        S: VerificationCodeStore + ?Sized,
    {
        for _ in 0..self.max_attempts {
            let candidate = OtpCode::new();
            if store.find_by_code(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(OtpGeneratorError::ExhaustedRetries(self.max_attempts))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::{DateTime, Utc};
    use otpauth_core::{OtpPurpose, VerificationCode};
    use uuid::Uuid;

    use super::*;

    /// Reports the first `collisions` lookups as taken, then none.
    struct CollidingStore {
        collisions: u32,
        lookups: AtomicU32,
    }

    impl CollidingStore {
        fn new(collisions: u32) -> Self {
            Self {
                collisions,
                lookups: AtomicU32::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl VerificationCodeStore for CollidingStore {
        async fn find_by_code(
            &self,
            code: &OtpCode,
        ) -> Result<Option<VerificationCode>, VerificationCodeStoreError> {
            let seen = self.lookups.fetch_add(1, Ordering::SeqCst);
            if seen < self.collisions {
                Ok(Some(VerificationCode::new(
                    Uuid::new_v4(),
                    OtpPurpose::AccountVerification,
                    code.clone(),
                    Utc::now(),
                )))
            } else {
                Ok(None)
            }
        }

        async fn find_pending(
            &self,
            _account_id: Uuid,
            _purpose: OtpPurpose,
        ) -> Result<Option<VerificationCode>, VerificationCodeStoreError> {
            unimplemented!()
        }

        async fn upsert(
            &self,
            _account_id: Uuid,
            _purpose: OtpPurpose,
            _code: OtpCode,
            _expires_at: DateTime<Utc>,
        ) -> Result<(), VerificationCodeStoreError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn returns_a_six_digit_code_when_the_space_is_free() {
        let store = CollidingStore::new(0);
        let code = OtpGenerator::default().generate_unique(&store).await.unwrap();
        assert_eq!(code.as_str().len(), 6);
        assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
    }

    #[tokio::test]
    async fn retries_past_taken_values() {
        let store = CollidingStore::new(3);
        let generator = OtpGenerator::default();
        assert!(generator.generate_unique(&store).await.is_ok());
        assert_eq!(store.lookups.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn fails_loudly_once_the_attempt_cap_is_reached() {
        let store = CollidingStore::new(u32::MAX);
        let generator = OtpGenerator::new(5);
        let result = generator.generate_unique(&store).await;
        assert!(matches!(
            result,
            Err(OtpGeneratorError::ExhaustedRetries(5))
        ));
    }
}
