pub mod env {
    pub const APP_ADDRESS_ENV_VAR: &str = "APP_ADDRESS";
    pub const DATABASE_URL_ENV_VAR: &str = "DATABASE_URL";
    pub const ACCESS_TOKEN_SECRET_ENV_VAR: &str = "ACCESS_TOKEN_SECRET";
    pub const REFRESH_TOKEN_SECRET_ENV_VAR: &str = "REFRESH_TOKEN_SECRET";
    pub const ACCESS_TOKEN_TTL_SECONDS_ENV_VAR: &str = "ACCESS_TOKEN_TTL_SECONDS";
    pub const REFRESH_TOKEN_TTL_DAYS_ENV_VAR: &str = "REFRESH_TOKEN_TTL_DAYS";
    pub const OTP_TTL_MINUTES_ENV_VAR: &str = "OTP_TTL_MINUTES";
    pub const OTP_DISPLAY_OFFSET_MINUTES_ENV_VAR: &str = "OTP_DISPLAY_OFFSET_MINUTES";
    pub const ARGON2_MEMORY_KIB_ENV_VAR: &str = "ARGON2_MEMORY_KIB";
    pub const ARGON2_ITERATIONS_ENV_VAR: &str = "ARGON2_ITERATIONS";
    pub const ARGON2_PARALLELISM_ENV_VAR: &str = "ARGON2_PARALLELISM";
    pub const POSTMARK_AUTH_TOKEN_ENV_VAR: &str = "POSTMARK_AUTH_TOKEN";
    pub const EMAIL_SENDER_ENV_VAR: &str = "EMAIL_SENDER";
    pub const ALLOWED_ORIGINS_ENV_VAR: &str = "ALLOWED_ORIGINS";
}

pub mod prod {
    pub const APP_ADDRESS: &str = "0.0.0.0:3000";

    pub mod email_client {
        use std::time::Duration;

        pub const BASE_URL: &str = "https://api.postmarkapp.com/";
        pub const TIMEOUT: Duration = Duration::from_secs(10);
    }
}

pub mod test {
    pub const APP_ADDRESS: &str = "127.0.0.1:0";

    pub mod email_client {
        use std::time::Duration;

        pub const SENDER: &str = "test@email.com";
        pub const TIMEOUT: Duration = Duration::from_millis(200);
    }
}
