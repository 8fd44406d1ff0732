use axum::{Json, extract::State, response::IntoResponse};
use otpauth_application::SignInUseCase;
use otpauth_core::{
    AccountProfile, AccountStore, Email, Password, PasswordHasher, SessionTokenStore, TokenIssuer,
};
use secrecy::Secret;
use serde::{Deserialize, Serialize};

use crate::error::AuthApiError;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: Secret<String>,
    pub password: Secret<String>,
}

#[derive(Debug, Serialize)]
pub struct SignInResponseBody {
    pub user: AccountProfile,
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

#[tracing::instrument(name = "Sign in", skip_all)]
pub async fn sign_in<S, H, T>(
    State(use_case): State<SignInUseCase<S, H, T>>,
    Json(request): Json<SignInRequest>,
) -> Result<impl IntoResponse, AuthApiError>
where
    S: AccountStore + SessionTokenStore + Clone + Send + Sync + 'static,
    H: PasswordHasher + Clone + Send + Sync + 'static,
    T: TokenIssuer + Clone + Send + Sync + 'static,
{
    let email = Email::try_from(request.email)?;
    let password = Password::try_from(request.password)?;

    let response = use_case.execute(email, password).await?;

    Ok(Json(SignInResponseBody {
        user: response.user,
        access_token: response.access_token,
        refresh_token: response.refresh_token,
    }))
}
