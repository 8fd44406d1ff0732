pub mod account;
pub mod email;
pub mod full_name;
pub mod otp;
pub mod password;
pub mod session_token;
pub mod verification;
