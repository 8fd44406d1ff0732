use chrono::{Duration, FixedOffset};
use color_eyre::eyre::{Result, eyre};
use otpauth_adapters::{
    config::{AuthSettings, constants::prod},
    email::PostmarkEmailClient,
    hashing::Argon2PasswordHasher,
    persistence::PostgresAuthStore,
    tokens::{JwtConfig, JwtTokenIssuer},
};
use otpauth_core::Email;
use otpauth_service::{AuthService, configure_postgresql, init_tracing};
use reqwest::Client as HttpClient;
use secrecy::Secret;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    init_tracing()?;

    let settings = AuthSettings::from_env()?;

    let pg_pool = configure_postgresql(&settings.database_url).await?;
    let store = PostgresAuthStore::new(pg_pool);

    let password_hasher = Argon2PasswordHasher::new(settings.hashing);

    let token_issuer = JwtTokenIssuer::new(JwtConfig {
        access_secret: settings.access_token_secret.clone(),
        refresh_secret: settings.refresh_token_secret.clone(),
        access_ttl_seconds: settings.access_token_ttl_seconds,
        refresh_ttl_days: settings.refresh_token_ttl_days,
    });

    let display_offset = FixedOffset::east_opt(settings.otp_display_offset_minutes * 60)
        .ok_or_else(|| eyre!("display offset out of range"))?;
    let http_client = HttpClient::builder()
        .timeout(prod::email_client::TIMEOUT)
        .build()?;
    let email_client = PostmarkEmailClient::new(
        prod::email_client::BASE_URL.to_string(),
        Email::try_from(Secret::from(settings.email_sender.clone()))?,
        settings.postmark_auth_token.clone(),
        display_offset,
        http_client,
    );

    let auth_service = AuthService::new(
        store,
        password_hasher,
        email_client,
        token_issuer,
        Duration::minutes(settings.otp_ttl_minutes),
    );

    let allowed_origins =
        (!settings.allowed_origins.is_empty()).then(|| settings.allowed_origins.clone());

    let listener = tokio::net::TcpListener::bind(&settings.app_address).await?;
    auth_service.run_standalone(listener, allowed_origins).await?;

    Ok(())
}
