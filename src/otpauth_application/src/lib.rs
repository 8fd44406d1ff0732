pub mod otp_generator;
pub mod use_cases;

pub use otp_generator::{OtpGenerator, OtpGeneratorError};
pub use use_cases::{
    register::{RegisterError, RegisterUseCase},
    request_otp::{RequestOtpError, RequestOtpUseCase},
    reset_password::{ResetPasswordError, ResetPasswordUseCase},
    sign_in::{SignInError, SignInResponse, SignInUseCase},
    verify_account::{VerifyAccountError, VerifyAccountUseCase},
};
