use axum::{Json, extract::State, response::IntoResponse};
use otpauth_application::VerifyAccountUseCase;
use otpauth_core::{AccountStore, Email, OtpCode, VerificationCodeStore};
use secrecy::Secret;
use serde::Deserialize;

use super::success;
use crate::error::AuthApiError;

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub email: Secret<String>,
    #[serde(rename = "verifyCode")]
    pub verify_code: String,
}

#[tracing::instrument(name = "Verify account", skip_all)]
pub async fn verify<S>(
    State(use_case): State<VerifyAccountUseCase<S>>,
    Json(request): Json<VerifyRequest>,
) -> Result<impl IntoResponse, AuthApiError>
where
    S: AccountStore + VerificationCodeStore + Clone + Send + Sync + 'static,
{
    let email = Email::try_from(request.email)?;
    let code = OtpCode::parse(request.verify_code)?;

    use_case.execute(email, code).await?;

    Ok(success())
}
