use async_trait::async_trait;
use chrono::{DateTime, Utc};
use otpauth_core::{
    Account, AccountStore, AccountStoreError, Email, OtpCode, OtpPurpose, SessionToken,
    SessionTokenStore, SessionTokenStoreError, VerificationCode, VerificationCodeStore,
    VerificationCodeStoreError,
};
use secrecy::{ExposeSecret, Secret};
use sqlx::{PgPool, Pool, Postgres, Row, postgres::PgRow};
use uuid::Uuid;

const EMAIL_UNIQUE_CONSTRAINT: &str = "accounts_email_key";
const CODE_UNIQUE_CONSTRAINT: &str = "verification_codes_code_key";

#[derive(Clone)]
pub struct PostgresAuthStore {
    pool: PgPool,
}

impl PostgresAuthStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PostgresAuthStore { pool }
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, AccountStoreError> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
    let full_name: String = row
        .try_get("full_name")
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
    let password_hash: String = row
        .try_get("password_hash")
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
    let role: String = row
        .try_get("role")
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
    let activated: bool = row
        .try_get("activated")
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

    Account::parse(
        id,
        Secret::from(email),
        full_name,
        Secret::from(password_hash),
        &role,
        activated,
    )
    .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))
}

fn verification_from_row(row: &PgRow) -> Result<VerificationCode, VerificationCodeStoreError> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| VerificationCodeStoreError::UnexpectedError(e.to_string()))?;
    let account_id: Uuid = row
        .try_get("account_id")
        .map_err(|e| VerificationCodeStoreError::UnexpectedError(e.to_string()))?;
    let purpose: String = row
        .try_get("purpose")
        .map_err(|e| VerificationCodeStoreError::UnexpectedError(e.to_string()))?;
    let code: String = row
        .try_get("code")
        .map_err(|e| VerificationCodeStoreError::UnexpectedError(e.to_string()))?;
    let expires_at: DateTime<Utc> = row
        .try_get("expires_at")
        .map_err(|e| VerificationCodeStoreError::UnexpectedError(e.to_string()))?;

    Ok(VerificationCode {
        id,
        account_id,
        purpose: purpose
            .parse()
            .map_err(|_| VerificationCodeStoreError::UnexpectedError("bad purpose".to_string()))?,
        code: OtpCode::parse(code)
            .map_err(|e| VerificationCodeStoreError::UnexpectedError(e.to_string()))?,
        expires_at,
    })
}

/// Translate a constraint violation into the matching domain error.
fn map_account_insert_error(err: sqlx::Error) -> AccountStoreError {
    if let Some(db_err) = err.as_database_error() {
        match db_err.constraint() {
            Some(EMAIL_UNIQUE_CONSTRAINT) => return AccountStoreError::AccountAlreadyExists,
            Some(CODE_UNIQUE_CONSTRAINT) => return AccountStoreError::CodeCollision,
            _ => {}
        }
    }
    AccountStoreError::UnexpectedError(err.to_string())
}

#[async_trait]
impl AccountStore for PostgresAuthStore {
    #[tracing::instrument(name = "Adding account to PostgreSQL", skip_all)]
    async fn add_account(
        &self,
        account: Account,
        code: VerificationCode,
    ) -> Result<(), AccountStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        sqlx::query(
            r#"
                INSERT INTO accounts (id, email, full_name, password_hash, role, activated)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.id)
        .bind(account.email.as_ref().expose_secret())
        .bind(account.full_name.as_ref())
        .bind(account.password_hash.expose_secret())
        .bind(account.role.as_str())
        .bind(account.activated)
        .execute(&mut *tx)
        .await
        .map_err(map_account_insert_error)?;

        sqlx::query(
            r#"
                INSERT INTO verification_codes (id, account_id, purpose, code, expires_at)
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(code.id)
        .bind(code.account_id)
        .bind(code.purpose.as_str())
        .bind(code.code.as_str())
        .bind(code.expires_at)
        .execute(&mut *tx)
        .await
        .map_err(map_account_insert_error)?;

        tx.commit()
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))
    }

    #[tracing::instrument(name = "Retrieving account from PostgreSQL", skip_all)]
    async fn get_account(&self, email: &Email) -> Result<Account, AccountStoreError> {
        let row = sqlx::query(
            r#"
                SELECT id, email, full_name, password_hash, role, activated
                FROM accounts
                WHERE email = $1
            "#,
        )
        .bind(email.as_ref().expose_secret())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(AccountStoreError::AccountNotFound);
        };

        account_from_row(&row)
    }

    #[tracing::instrument(name = "Deleting account from PostgreSQL", skip_all)]
    async fn delete_account(&self, id: Uuid) -> Result<(), AccountStoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AccountStoreError::AccountNotFound);
        }

        Ok(())
    }

    #[tracing::instrument(name = "Activating account in PostgreSQL", skip_all)]
    async fn activate_account(&self, id: Uuid, code_id: Uuid) -> Result<(), AccountStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        let updated = sqlx::query("UPDATE accounts SET activated = TRUE WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        if updated.rows_affected() == 0 {
            return Err(AccountStoreError::AccountNotFound);
        }

        let consumed = sqlx::query("DELETE FROM verification_codes WHERE id = $1")
            .bind(code_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        if consumed.rows_affected() == 0 {
            // Dropping the transaction rolls the activation back.
            return Err(AccountStoreError::UnexpectedError(
                "verification code already consumed".to_string(),
            ));
        }

        tx.commit()
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))
    }

    #[tracing::instrument(name = "Setting new password in PostgreSQL", skip_all)]
    async fn set_password(
        &self,
        id: Uuid,
        new_password_hash: Secret<String>,
        code_id: Uuid,
    ) -> Result<(), AccountStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        let updated = sqlx::query("UPDATE accounts SET password_hash = $1 WHERE id = $2")
            .bind(new_password_hash.expose_secret())
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        if updated.rows_affected() == 0 {
            return Err(AccountStoreError::AccountNotFound);
        }

        let consumed = sqlx::query("DELETE FROM verification_codes WHERE id = $1")
            .bind(code_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        if consumed.rows_affected() == 0 {
            return Err(AccountStoreError::UnexpectedError(
                "verification code already consumed".to_string(),
            ));
        }

        tx.commit()
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))
    }
}

#[async_trait]
impl VerificationCodeStore for PostgresAuthStore {
    #[tracing::instrument(name = "Looking up code value in PostgreSQL", skip_all)]
    async fn find_by_code(
        &self,
        code: &OtpCode,
    ) -> Result<Option<VerificationCode>, VerificationCodeStoreError> {
        let row = sqlx::query(
            r#"
                SELECT id, account_id, purpose, code, expires_at
                FROM verification_codes
                WHERE code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| VerificationCodeStoreError::UnexpectedError(e.to_string()))?;

        row.as_ref().map(verification_from_row).transpose()
    }

    #[tracing::instrument(name = "Looking up pending code in PostgreSQL", skip_all)]
    async fn find_pending(
        &self,
        account_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<Option<VerificationCode>, VerificationCodeStoreError> {
        let row = sqlx::query(
            r#"
                SELECT id, account_id, purpose, code, expires_at
                FROM verification_codes
                WHERE account_id = $1 AND purpose = $2
            "#,
        )
        .bind(account_id)
        .bind(purpose.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| VerificationCodeStoreError::UnexpectedError(e.to_string()))?;

        row.as_ref().map(verification_from_row).transpose()
    }

    #[tracing::instrument(name = "Rotating code in PostgreSQL", skip_all)]
    async fn upsert(
        &self,
        account_id: Uuid,
        purpose: OtpPurpose,
        code: OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), VerificationCodeStoreError> {
        sqlx::query(
            r#"
                INSERT INTO verification_codes (id, account_id, purpose, code, expires_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (account_id, purpose)
                DO UPDATE SET code = EXCLUDED.code, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(purpose.as_str())
        .bind(code.as_str())
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.constraint() == Some(CODE_UNIQUE_CONSTRAINT) {
                    return VerificationCodeStoreError::CodeCollision;
                }
            }
            VerificationCodeStoreError::UnexpectedError(e.to_string())
        })?;

        Ok(())
    }
}

#[async_trait]
impl SessionTokenStore for PostgresAuthStore {
    #[tracing::instrument(name = "Persisting refresh token in PostgreSQL", skip_all)]
    async fn add_token(&self, token: SessionToken) -> Result<(), SessionTokenStoreError> {
        sqlx::query(
            r#"
                INSERT INTO session_tokens (id, account_id, refresh_token, expires_at)
                VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(token.account_id)
        .bind(token.refresh_token)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| SessionTokenStoreError::UnexpectedError(e.to_string()))?;

        Ok(())
    }
}
