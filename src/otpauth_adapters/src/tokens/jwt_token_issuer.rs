use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use otpauth_core::{Account, AccountRole, SessionToken, TokenIssuer, TokenIssuerError};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone)]
pub struct JwtConfig {
    pub access_secret: Secret<String>,
    pub refresh_secret: Secret<String>,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_days: i64,
}

#[derive(Clone)]
pub struct JwtTokenIssuer {
    config: JwtConfig,
}

impl JwtTokenIssuer {
    pub fn new(config: JwtConfig) -> Self {
        JwtTokenIssuer { config }
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue_access_token(&self, account: &Account) -> Result<String, TokenIssuerError> {
        let exp = expiry_timestamp(chrono::Duration::seconds(self.config.access_ttl_seconds))?.1;

        let claims = AccessClaims {
            id: account.id,
            email: account.email.as_ref().expose_secret().clone(),
            role: account.role,
            exp,
        };

        create_token(&claims, self.config.access_secret.expose_secret().as_bytes())
    }

    fn issue_refresh_token(&self, account: &Account) -> Result<SessionToken, TokenIssuerError> {
        let (expires_at, exp) =
            expiry_timestamp(chrono::Duration::days(self.config.refresh_ttl_days))?;

        let claims = RefreshClaims {
            sub: account.id,
            exp,
        };
        let refresh_token =
            create_token(&claims, self.config.refresh_secret.expose_secret().as_bytes())?;

        Ok(SessionToken {
            account_id: account.id,
            refresh_token,
            expires_at,
        })
    }
}

fn expiry_timestamp(ttl: chrono::Duration) -> Result<(DateTime<Utc>, usize), TokenIssuerError> {
    let expires_at = Utc::now()
        .checked_add_signed(ttl)
        .ok_or(TokenIssuerError::UnexpectedError(
            "Duration out of range".to_string(),
        ))?;

    let exp: usize = expires_at.timestamp().try_into().map_err(|_| {
        TokenIssuerError::UnexpectedError("Failed to cast i64 to usize".to_string())
    })?;

    Ok((expires_at, exp))
}

fn create_token<C: Serialize>(claims: &C, secret: &[u8]) -> Result<String, TokenIssuerError> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret))
        .map_err(|e| TokenIssuerError::TokenError(e.to_string()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub id: Uuid,
    pub email: String,
    pub role: AccountRole,
    pub exp: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub exp: usize,
}
