use otpauth_core::{
    AccountProfile, AccountStore, AccountStoreError, Email, Password, PasswordHasher,
    PasswordHasherError, SessionTokenStore, SessionTokenStoreError, TokenIssuer, TokenIssuerError,
};

/// Successful sign-in: the redacted profile plus both tokens.
#[derive(Debug, Clone)]
pub struct SignInResponse {
    pub user: AccountProfile,
    pub access_token: String,
    pub refresh_token: String,
}

/// Error types specific to the sign in use case
#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
    #[error("Username or password is not correct")]
    IncorrectPassword,
    #[error("Account is not activated")]
    NotActivated,
    #[error("Password hasher error: {0}")]
    PasswordHasherError(PasswordHasherError),
    #[error("Token issuer error: {0}")]
    TokenIssuerError(#[from] TokenIssuerError),
    #[error("Session token store error: {0}")]
    SessionTokenStoreError(#[from] SessionTokenStoreError),
}

/// Sign in use case - authenticates credentials, refuses unverified
/// accounts, and issues the access/refresh token pair.
///
/// The refresh token is persisted with its expiry; earlier session tokens
/// for the same account stay valid.
#[derive(Clone)]
pub struct SignInUseCase<S, H, T>
where
    S: AccountStore + SessionTokenStore,
    H: PasswordHasher,
    T: TokenIssuer,
{
    store: S,
    password_hasher: H,
    token_issuer: T,
}

impl<S, H, T> SignInUseCase<S, H, T>
where
    S: AccountStore + SessionTokenStore,
    H: PasswordHasher,
    T: TokenIssuer,
{
    pub fn new(store: S, password_hasher: H, token_issuer: T) -> Self {
        Self {
            store,
            password_hasher,
            token_issuer,
        }
    }

    #[tracing::instrument(name = "SignInUseCase::execute", skip_all)]
    pub async fn execute(
        &self,
        email: Email,
        password: Password,
    ) -> Result<SignInResponse, SignInError> {
        let account = self.store.get_account(&email).await?;

        self.password_hasher
            .verify(account.password_hash.clone(), password)
            .await
            .map_err(|err| match err {
                PasswordHasherError::IncorrectPassword => SignInError::IncorrectPassword,
                other => SignInError::PasswordHasherError(other),
            })?;

        if !account.activated {
            return Err(SignInError::NotActivated);
        }

        let access_token = self.token_issuer.issue_access_token(&account)?;
        let session = self.token_issuer.issue_refresh_token(&account)?;
        self.store.add_token(session.clone()).await?;

        Ok(SignInResponse {
            user: account.profile(),
            access_token,
            refresh_token: session.refresh_token,
        })
    }
}
