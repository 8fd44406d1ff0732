pub mod config;
pub mod email;
pub mod hashing;
pub mod persistence;
pub mod tokens;
