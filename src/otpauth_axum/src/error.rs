use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use otpauth_application::{
    OtpGeneratorError, RegisterError, RequestOtpError, ResetPasswordError, SignInError,
    VerifyAccountError,
};
use otpauth_core::{
    AccountStoreError, EmailError, FullNameError, OtpError, PasswordError, PasswordHasherError,
    SessionTokenStoreError, TokenIssuerError, VerificationCodeStoreError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AuthApiError {
    #[error("Email is already taken")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("No pending code for this request")]
    NoPendingCode,

    #[error("OTP is not correct")]
    IncorrectOtp,

    #[error("OTP is expired")]
    ExpiredOtp,

    #[error("Account is not activated")]
    AccountNotActivated,

    #[error("Username or password is not correct")]
    IncorrectCredentials,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let status_code = match self {
            AuthApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,

            AuthApiError::EmailTaken => StatusCode::CONFLICT,

            AuthApiError::UserNotFound | AuthApiError::NoPendingCode => StatusCode::NOT_FOUND,

            AuthApiError::IncorrectOtp
            | AuthApiError::ExpiredOtp
            | AuthApiError::AccountNotActivated => StatusCode::NOT_ACCEPTABLE,

            AuthApiError::IncorrectCredentials => StatusCode::UNAUTHORIZED,

            AuthApiError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status_code, body).into_response()
    }
}

impl From<EmailError> for AuthApiError {
    fn from(error: EmailError) -> Self {
        AuthApiError::InvalidInput(error.to_string())
    }
}

impl From<PasswordError> for AuthApiError {
    fn from(error: PasswordError) -> Self {
        AuthApiError::InvalidInput(error.to_string())
    }
}

impl From<FullNameError> for AuthApiError {
    fn from(error: FullNameError) -> Self {
        AuthApiError::InvalidInput(error.to_string())
    }
}

impl From<OtpError> for AuthApiError {
    fn from(error: OtpError) -> Self {
        AuthApiError::InvalidInput(error.to_string())
    }
}

impl From<AccountStoreError> for AuthApiError {
    fn from(error: AccountStoreError) -> Self {
        match error {
            AccountStoreError::AccountAlreadyExists => AuthApiError::EmailTaken,
            AccountStoreError::AccountNotFound => AuthApiError::UserNotFound,
            AccountStoreError::CodeCollision => AuthApiError::UnexpectedError(error.to_string()),
            AccountStoreError::UnexpectedError(e) => AuthApiError::UnexpectedError(e),
        }
    }
}

impl From<VerificationCodeStoreError> for AuthApiError {
    fn from(error: VerificationCodeStoreError) -> Self {
        AuthApiError::UnexpectedError(error.to_string())
    }
}

impl From<SessionTokenStoreError> for AuthApiError {
    fn from(error: SessionTokenStoreError) -> Self {
        AuthApiError::UnexpectedError(error.to_string())
    }
}

impl From<PasswordHasherError> for AuthApiError {
    fn from(error: PasswordHasherError) -> Self {
        match error {
            PasswordHasherError::IncorrectPassword => AuthApiError::IncorrectCredentials,
            PasswordHasherError::UnexpectedError(e) => AuthApiError::UnexpectedError(e),
        }
    }
}

impl From<TokenIssuerError> for AuthApiError {
    fn from(error: TokenIssuerError) -> Self {
        AuthApiError::UnexpectedError(error.to_string())
    }
}

impl From<OtpGeneratorError> for AuthApiError {
    fn from(error: OtpGeneratorError) -> Self {
        AuthApiError::UnexpectedError(error.to_string())
    }
}

impl From<RegisterError> for AuthApiError {
    fn from(error: RegisterError) -> Self {
        match error {
            RegisterError::AccountStoreError(e) => e.into(),
            RegisterError::PasswordHasherError(e) => e.into(),
            RegisterError::OtpGeneratorError(e) => e.into(),
            RegisterError::EmailError(e) => AuthApiError::UnexpectedError(e),
        }
    }
}

impl From<VerifyAccountError> for AuthApiError {
    fn from(error: VerifyAccountError) -> Self {
        match error {
            VerifyAccountError::AccountStoreError(e) => e.into(),
            VerifyAccountError::CodeStoreError(e) => e.into(),
            VerifyAccountError::NoPendingCode => AuthApiError::NoPendingCode,
            VerifyAccountError::IncorrectOtp => AuthApiError::IncorrectOtp,
            VerifyAccountError::ExpiredOtp => AuthApiError::ExpiredOtp,
        }
    }
}

impl From<RequestOtpError> for AuthApiError {
    fn from(error: RequestOtpError) -> Self {
        match error {
            RequestOtpError::AccountStoreError(e) => e.into(),
            RequestOtpError::CodeStoreError(e) => e.into(),
            RequestOtpError::OtpGeneratorError(e) => e.into(),
            RequestOtpError::EmailError(e) => AuthApiError::UnexpectedError(e),
        }
    }
}

impl From<ResetPasswordError> for AuthApiError {
    fn from(error: ResetPasswordError) -> Self {
        match error {
            ResetPasswordError::AccountStoreError(e) => e.into(),
            ResetPasswordError::CodeStoreError(e) => e.into(),
            ResetPasswordError::PasswordHasherError(e) => e.into(),
            ResetPasswordError::NoPendingCode => AuthApiError::NoPendingCode,
            ResetPasswordError::IncorrectOtp => AuthApiError::IncorrectOtp,
            ResetPasswordError::ExpiredOtp => AuthApiError::ExpiredOtp,
        }
    }
}

impl From<SignInError> for AuthApiError {
    fn from(error: SignInError) -> Self {
        match error {
            SignInError::AccountStoreError(e) => e.into(),
            SignInError::IncorrectPassword => AuthApiError::IncorrectCredentials,
            SignInError::NotActivated => AuthApiError::AccountNotActivated,
            SignInError::PasswordHasherError(e) => e.into(),
            SignInError::TokenIssuerError(e) => e.into(),
            SignInError::SessionTokenStoreError(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: AuthApiError) -> StatusCode {
        error.into_response().status()
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        assert_eq!(status_of(AuthApiError::EmailTaken), StatusCode::CONFLICT);
    }

    #[test]
    fn missing_account_and_missing_code_are_not_found() {
        assert_eq!(status_of(AuthApiError::UserNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AuthApiError::NoPendingCode),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn otp_failures_and_unactivated_sign_in_are_not_acceptable() {
        for error in [
            AuthApiError::IncorrectOtp,
            AuthApiError::ExpiredOtp,
            AuthApiError::AccountNotActivated,
        ] {
            assert_eq!(status_of(error), StatusCode::NOT_ACCEPTABLE);
        }
    }

    #[test]
    fn bad_credentials_are_unauthorized() {
        assert_eq!(
            status_of(AuthApiError::IncorrectCredentials),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn sign_in_errors_map_through() {
        assert_eq!(
            status_of(SignInError::NotActivated.into()),
            StatusCode::NOT_ACCEPTABLE
        );
        assert_eq!(
            status_of(SignInError::IncorrectPassword.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(SignInError::AccountStoreError(AccountStoreError::AccountNotFound).into()),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn register_duplicate_maps_to_conflict() {
        let error: AuthApiError =
            RegisterError::AccountStoreError(AccountStoreError::AccountAlreadyExists).into();
        assert_eq!(status_of(error), StatusCode::CONFLICT);
    }
}
