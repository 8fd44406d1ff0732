//! Axum route handlers for the account lifecycle service.
//!
//! Routes parse the camelCase request bodies into domain newtypes, run the
//! matching use case from `otpauth_application`, and map its error enum onto
//! HTTP status codes via [`AuthApiError`].

pub mod error;
pub mod routes;

pub use error::{AuthApiError, ErrorResponse};
