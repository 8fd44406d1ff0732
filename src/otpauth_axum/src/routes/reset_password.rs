use axum::{Json, extract::State, response::IntoResponse};
use otpauth_application::ResetPasswordUseCase;
use otpauth_core::{AccountStore, Email, OtpCode, Password, PasswordHasher, VerificationCodeStore};
use secrecy::Secret;
use serde::Deserialize;

use super::success;
use crate::error::AuthApiError;

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: Secret<String>,
    pub password: Secret<String>,
    pub otp: String,
}

#[tracing::instrument(name = "Reset password", skip_all)]
pub async fn reset_password<S, H>(
    State(use_case): State<ResetPasswordUseCase<S, H>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AuthApiError>
where
    S: AccountStore + VerificationCodeStore + Clone + Send + Sync + 'static,
    H: PasswordHasher + Clone + Send + Sync + 'static,
{
    let email = Email::try_from(request.email)?;
    let new_password = Password::try_from(request.password)?;
    let code = OtpCode::parse(request.otp)?;

    use_case.execute(email, new_password, code).await?;

    Ok(success())
}
