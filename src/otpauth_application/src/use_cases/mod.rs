pub mod register;
pub mod request_otp;
pub mod reset_password;
pub mod sign_in;
pub mod verify_account;
