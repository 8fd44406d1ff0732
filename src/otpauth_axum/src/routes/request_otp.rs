use axum::{Json, extract::State, response::IntoResponse};
use otpauth_application::RequestOtpUseCase;
use otpauth_core::{AccountStore, Email, EmailClient, OtpPurpose, VerificationCodeStore};
use secrecy::Secret;
use serde::Deserialize;

use super::success;
use crate::error::AuthApiError;

#[derive(Debug, Deserialize)]
pub struct RequestOtpRequest {
    pub email: Secret<String>,
}

#[tracing::instrument(name = "Request verification code", skip_all)]
pub async fn request_verify_code<S, E>(
    State(use_case): State<RequestOtpUseCase<S, E>>,
    Json(request): Json<RequestOtpRequest>,
) -> Result<impl IntoResponse, AuthApiError>
where
    S: AccountStore + VerificationCodeStore + Clone + Send + Sync + 'static,
    E: EmailClient + Clone + Send + Sync + 'static,
{
    rotate(use_case, request, OtpPurpose::AccountVerification).await
}

#[tracing::instrument(name = "Request password reset code", skip_all)]
pub async fn request_reset_password<S, E>(
    State(use_case): State<RequestOtpUseCase<S, E>>,
    Json(request): Json<RequestOtpRequest>,
) -> Result<impl IntoResponse, AuthApiError>
where
    S: AccountStore + VerificationCodeStore + Clone + Send + Sync + 'static,
    E: EmailClient + Clone + Send + Sync + 'static,
{
    rotate(use_case, request, OtpPurpose::PasswordReset).await
}

async fn rotate<S, E>(
    use_case: RequestOtpUseCase<S, E>,
    request: RequestOtpRequest,
    purpose: OtpPurpose,
) -> Result<Json<serde_json::Value>, AuthApiError>
where
    S: AccountStore + VerificationCodeStore + Clone + Send + Sync + 'static,
    E: EmailClient + Clone + Send + Sync + 'static,
{
    let email = Email::try_from(request.email)?;
    use_case.execute(email, purpose).await?;

    Ok(success())
}
