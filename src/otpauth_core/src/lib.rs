pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    account::{Account, AccountParseError, AccountProfile, AccountRole, RoleError},
    email::{Email, EmailError},
    full_name::{FullName, FullNameError},
    otp::{OtpCode, OtpError, OtpPurpose},
    password::{Password, PasswordError},
    session_token::SessionToken,
    verification::VerificationCode,
};

pub use ports::{
    repositories::{
        AccountStore, AccountStoreError, SessionTokenStore, SessionTokenStoreError,
        VerificationCodeStore, VerificationCodeStoreError,
    },
    services::{
        EmailClient, OtpEmail, PasswordHasher, PasswordHasherError, TokenIssuer, TokenIssuerError,
    },
};
