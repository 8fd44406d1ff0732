//! # OtpAuth - Account Lifecycle Service Library
//!
//! Facade crate that re-exports the public APIs of the service components:
//! registration with email verification, one-time-code flows, password reset
//! and JWT sign-in.
//!
//! ## Structure
//!
//! - **Core domain types**: `Email`, `Password`, `Account`, `OtpCode`, etc.
//! - **Port traits**: `AccountStore`, `VerificationCodeStore`,
//!   `SessionTokenStore`, `EmailClient`, `PasswordHasher`, `TokenIssuer`
//! - **Use cases**: `RegisterUseCase`, `VerifyAccountUseCase`, `SignInUseCase`, etc.
//! - **Adapters**: `PostgresAuthStore`, `InMemoryAuthStore`,
//!   `PostmarkEmailClient`, `Argon2PasswordHasher`, `JwtTokenIssuer`
//! - **Service**: `AuthService` - the assembled router and server

/// Core domain types and value objects
pub mod core {
    pub use otpauth_core::*;
}

// Re-export the most commonly used core types at the root level
pub use otpauth_core::{
    Account, AccountProfile, AccountRole, Email, FullName, OtpCode, OtpPurpose, Password,
    SessionToken, VerificationCode,
};

/// Port trait definitions
pub mod ports {
    pub use otpauth_core::{
        AccountStore, AccountStoreError, EmailClient, PasswordHasher, PasswordHasherError,
        SessionTokenStore, SessionTokenStoreError, TokenIssuer, TokenIssuerError,
        VerificationCodeStore, VerificationCodeStoreError,
    };
}

pub use otpauth_core::{
    AccountStore, AccountStoreError, EmailClient, PasswordHasher, SessionTokenStore, TokenIssuer,
    VerificationCodeStore,
};

/// Application use cases
pub mod use_cases {
    pub use otpauth_application::*;
}

pub use otpauth_application::{
    OtpGenerator, RegisterUseCase, RequestOtpUseCase, ResetPasswordUseCase, SignInUseCase,
    VerifyAccountUseCase,
};

/// Infrastructure adapters
pub mod adapters {
    /// Persistence implementations
    pub mod persistence {
        pub use otpauth_adapters::persistence::*;
    }

    /// Email client implementations
    pub mod email {
        pub use otpauth_adapters::email::*;
    }

    /// Password hashing
    pub mod hashing {
        pub use otpauth_adapters::hashing::*;
    }

    /// Token issuing
    pub mod tokens {
        pub use otpauth_adapters::tokens::*;
    }

    /// Configuration
    pub mod config {
        pub use otpauth_adapters::config::*;
    }
}

// Re-export commonly used adapters at root level
pub use otpauth_adapters::{
    email::{MockEmailClient, PostmarkEmailClient},
    hashing::Argon2PasswordHasher,
    persistence::{InMemoryAuthStore, PostgresAuthStore},
    tokens::JwtTokenIssuer,
};

/// Axum route handlers and the HTTP error mapping
pub mod routes {
    pub use otpauth_axum::routes::*;

    pub use otpauth_axum::{AuthApiError, ErrorResponse};
}

/// Main auth service
pub use otpauth_service::{AuthService, configure_postgresql, get_postgres_pool, init_tracing};

/// Re-export async-trait for implementing the port traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

pub use http;
