//! One module per endpoint. Every handler takes its pre-built use case as
//! axum state and returns `{"success": true}` unless it has a richer body.

pub mod request_otp;
pub mod reset_password;
pub mod sign_in;
pub mod sign_up;
pub mod verify;

pub use request_otp::{request_reset_password, request_verify_code};
pub use reset_password::reset_password;
pub use sign_in::sign_in;
pub use sign_up::sign_up;
pub use verify::verify;

pub(crate) fn success() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "success": true }))
}
