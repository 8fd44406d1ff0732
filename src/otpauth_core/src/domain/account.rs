use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::email::{Email, EmailError};
use super::full_name::{FullName, FullNameError};

#[derive(Debug, Error)]
pub enum RoleError {
    #[error("Unknown account role")]
    UnknownRole,
}

/// Role stored on the account and embedded into access token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRole {
    #[default]
    User,
    Admin,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::User => "USER",
            AccountRole::Admin => "ADMIN",
        }
    }
}

impl std::str::FromStr for AccountRole {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(AccountRole::User),
            "ADMIN" => Ok(AccountRole::Admin),
            _ => Err(RoleError::UnknownRole),
        }
    }
}

#[derive(Debug, Error)]
pub enum AccountParseError {
    #[error(transparent)]
    Email(#[from] EmailError),
    #[error(transparent)]
    FullName(#[from] FullNameError),
    #[error(transparent)]
    Role(#[from] RoleError),
}

/// The root entity. Created inactive on registration and activated exactly
/// once by a successful verification.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: Email,
    pub full_name: FullName,
    pub password_hash: Secret<String>,
    pub role: AccountRole,
    pub activated: bool,
}

impl Account {
    pub fn new(
        email: Email,
        full_name: FullName,
        password_hash: Secret<String>,
        role: AccountRole,
    ) -> Self {
        Account {
            id: Uuid::new_v4(),
            email,
            full_name,
            password_hash,
            role,
            activated: false,
        }
    }

    /// Rehydrate an account from storage, re-validating the stored fields.
    pub fn parse(
        id: Uuid,
        email: Secret<String>,
        full_name: String,
        password_hash: Secret<String>,
        role: &str,
        activated: bool,
    ) -> Result<Self, AccountParseError> {
        Ok(Account {
            id,
            email: Email::try_from(email)?,
            full_name: FullName::try_from(full_name)?,
            password_hash,
            role: role.parse()?,
            activated,
        })
    }

    /// The externally visible view of the account. The password hash is
    /// stripped here, before the value can cross any boundary.
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id,
            email: self.email.as_ref().expose_secret().clone(),
            full_name: self.full_name.to_string(),
            role: self.role,
            activated: self.activated,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: Uuid,
    pub email: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub role: AccountRole,
    pub activated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new(
            Email::try_from(Secret::from("alice@example.com".to_string())).unwrap(),
            FullName::try_from("Alice".to_string()).unwrap(),
            Secret::from("$argon2id$fake-hash".to_string()),
            AccountRole::User,
        )
    }

    #[test]
    fn new_accounts_start_inactive() {
        assert!(!account().activated);
    }

    #[test]
    fn profile_never_carries_the_password_hash() {
        let profile = account().profile();
        let rendered = serde_json::to_string(&profile).unwrap();
        assert!(!rendered.contains("password"));
        assert!(!rendered.contains("argon2"));
        assert!(rendered.contains("alice@example.com"));
    }

    #[test]
    fn role_round_trips_through_str() {
        use std::str::FromStr;

        for role in [AccountRole::User, AccountRole::Admin] {
            assert_eq!(AccountRole::from_str(role.as_str()).unwrap(), role);
        }
        assert!(AccountRole::from_str("ROOT").is_err());
    }
}
