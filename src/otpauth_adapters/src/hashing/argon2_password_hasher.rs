use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{PasswordHasher as _, SaltString, rand_core},
};
use otpauth_core::{Password, PasswordHasher, PasswordHasherError};
use secrecy::{ExposeSecret, Secret};

/// Argon2id cost parameters. Production values come from configuration;
/// tests use `light()` to keep hashing fast.
#[derive(Debug, Clone, Copy)]
pub struct HashingParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl HashingParams {
    pub fn light() -> Self {
        HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for HashingParams {
    fn default() -> Self {
        HashingParams {
            memory_kib: 15000,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: HashingParams,
}

impl Argon2PasswordHasher {
    pub fn new(params: HashingParams) -> Self {
        Argon2PasswordHasher { params }
    }

    fn argon2(&self) -> Result<Argon2<'static>, PasswordHasherError> {
        let params = Params::new(
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            None,
        )
        .map_err(|e| PasswordHasherError::UnexpectedError(e.to_string()))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[async_trait::async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    #[tracing::instrument(name = "Computing password hash", skip_all)]
    async fn hash(&self, password: Password) -> Result<Secret<String>, PasswordHasherError> {
        let hasher = self.argon2()?;
        let current_span: tracing::Span = tracing::Span::current();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(move || {
                let salt: SaltString = SaltString::generate(rand_core::OsRng);
                hasher
                    .hash_password(password.as_ref().expose_secret().as_bytes(), &salt)
                    .map(|h| Secret::from(h.to_string()))
                    .map_err(|e| PasswordHasherError::UnexpectedError(e.to_string()))
            })
        })
        .await
        .map_err(|e| PasswordHasherError::UnexpectedError(e.to_string()))?
    }

    #[tracing::instrument(name = "Verifying password hash", skip_all)]
    async fn verify(
        &self,
        expected_hash: Secret<String>,
        candidate: Password,
    ) -> Result<(), PasswordHasherError> {
        let hasher = self.argon2()?;
        let current_span: tracing::Span = tracing::Span::current();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| {
                let expected_hash: PasswordHash<'_> =
                    PasswordHash::new(expected_hash.expose_secret())
                        .map_err(|e| PasswordHasherError::UnexpectedError(e.to_string()))?;

                hasher
                    .verify_password(
                        candidate.as_ref().expose_secret().as_bytes(),
                        &expected_hash,
                    )
                    .map_err(|e| match e {
                        argon2::password_hash::Error::Password => {
                            PasswordHasherError::IncorrectPassword
                        }
                        other => PasswordHasherError::UnexpectedError(other.to_string()),
                    })
            })
        })
        .await
        .map_err(|e| PasswordHasherError::UnexpectedError(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn password(raw: &str) -> Password {
        Password::try_from(Secret::from(raw.to_string())).unwrap()
    }

    #[tokio::test]
    async fn verifies_a_hash_it_produced() {
        let hasher = Argon2PasswordHasher::new(HashingParams::light());

        let hash = hasher.hash(password("hunter2hunter2")).await.unwrap();

        assert!(
            hasher
                .verify(hash, password("hunter2hunter2"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn rejects_the_wrong_password() {
        let hasher = Argon2PasswordHasher::new(HashingParams::light());

        let hash = hasher.hash(password("hunter2hunter2")).await.unwrap();
        let result = hasher.verify(hash, password("wrong-password")).await;

        assert!(matches!(result, Err(PasswordHasherError::IncorrectPassword)));
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let hasher = Argon2PasswordHasher::new(HashingParams::light());

        let first = hasher.hash(password("hunter2hunter2")).await.unwrap();
        let second = hasher.hash(password("hunter2hunter2")).await.unwrap();

        assert_ne!(first.expose_secret(), second.expose_secret());
    }

    #[tokio::test]
    async fn garbage_hashes_are_not_an_incorrect_password() {
        let hasher = Argon2PasswordHasher::new(HashingParams::light());

        let result = hasher
            .verify(
                Secret::from("not-a-phc-string".to_string()),
                password("hunter2hunter2"),
            )
            .await;

        assert!(matches!(
            result,
            Err(PasswordHasherError::UnexpectedError(_))
        ));
    }
}
