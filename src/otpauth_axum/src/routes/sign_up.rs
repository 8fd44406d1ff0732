use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use otpauth_application::RegisterUseCase;
use otpauth_core::{
    AccountRole, AccountStore, Email, EmailClient, FullName, Password, PasswordHasher,
    VerificationCodeStore,
};
use secrecy::Secret;
use serde::Deserialize;

use super::success;
use crate::error::AuthApiError;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: Secret<String>,
    pub password: Secret<String>,
    pub role: Option<AccountRole>,
}

#[tracing::instrument(name = "Sign up", skip_all)]
pub async fn sign_up<S, H, E>(
    State(use_case): State<RegisterUseCase<S, H, E>>,
    Json(request): Json<SignUpRequest>,
) -> Result<impl IntoResponse, AuthApiError>
where
    S: AccountStore + VerificationCodeStore + Clone + Send + Sync + 'static,
    H: PasswordHasher + Clone + Send + Sync + 'static,
    E: EmailClient + Clone + Send + Sync + 'static,
{
    let full_name = FullName::try_from(request.full_name)?;
    let email = Email::try_from(request.email)?;
    let password = Password::try_from(request.password)?;

    use_case
        .execute(full_name, email, password, request.role)
        .await?;

    Ok((StatusCode::CREATED, success()))
}
