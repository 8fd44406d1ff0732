mod auth_service;
mod helpers;
mod tracing;

pub use auth_service::AuthService;
pub use helpers::{configure_postgresql, get_postgres_pool};
pub use tracing::init_tracing;

// Re-export commonly used types
pub use otpauth_core::{
    AccountStore, Email, EmailClient, PasswordHasher, SessionTokenStore, TokenIssuer,
    VerificationCodeStore,
};
