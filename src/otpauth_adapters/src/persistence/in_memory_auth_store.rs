use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use otpauth_core::{
    Account, AccountStore, AccountStoreError, Email, OtpCode, OtpPurpose, SessionToken,
    SessionTokenStore, SessionTokenStoreError, VerificationCode, VerificationCodeStore,
    VerificationCodeStoreError,
};
use secrecy::Secret;
use uuid::Uuid;

#[derive(Default)]
struct StoreState {
    accounts: HashMap<Uuid, Account>,
    codes: HashMap<Uuid, VerificationCode>,
    tokens: Vec<SessionToken>,
}

/// In-memory backend for tests and local development.
///
/// All mutations for one operation happen under a single write lock, which
/// gives the same all-or-nothing visibility the Postgres store gets from
/// transactions.
#[derive(Clone, Default)]
pub struct InMemoryAuthStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Test helper: insert an account directly, bypassing registration.
    pub fn seed_account(&self, account: Account) {
        self.write().accounts.insert(account.id, account);
    }

    /// Test helper: insert a verification code directly.
    pub fn seed_code(&self, code: VerificationCode) {
        self.write().codes.insert(code.id, code);
    }

    /// Test helper: number of persisted refresh token records.
    pub fn session_token_count(&self) -> usize {
        self.read().tokens.len()
    }
}

impl StoreState {
    fn email_taken(&self, email: &Email) -> bool {
        self.accounts.values().any(|a| &a.email == email)
    }

    fn code_taken(&self, code: &OtpCode) -> bool {
        self.codes.values().any(|c| &c.code == code)
    }

    fn cascade_delete(&mut self, account_id: Uuid) {
        self.codes.retain(|_, c| c.account_id != account_id);
        self.tokens.retain(|t| t.account_id != account_id);
    }
}

#[async_trait]
impl AccountStore for InMemoryAuthStore {
    async fn add_account(
        &self,
        account: Account,
        code: VerificationCode,
    ) -> Result<(), AccountStoreError> {
        let mut state = self.write();
        if state.email_taken(&account.email) {
            return Err(AccountStoreError::AccountAlreadyExists);
        }
        if state.code_taken(&code.code) {
            return Err(AccountStoreError::CodeCollision);
        }
        state.codes.insert(code.id, code);
        state.accounts.insert(account.id, account);
        Ok(())
    }

    async fn get_account(&self, email: &Email) -> Result<Account, AccountStoreError> {
        self.read()
            .accounts
            .values()
            .find(|a| &a.email == email)
            .cloned()
            .ok_or(AccountStoreError::AccountNotFound)
    }

    async fn delete_account(&self, id: Uuid) -> Result<(), AccountStoreError> {
        let mut state = self.write();
        state
            .accounts
            .remove(&id)
            .ok_or(AccountStoreError::AccountNotFound)?;
        state.cascade_delete(id);
        Ok(())
    }

    async fn activate_account(&self, id: Uuid, code_id: Uuid) -> Result<(), AccountStoreError> {
        let mut state = self.write();
        // Validate both halves before touching either, so a failure can
        // never leave the transition half-applied.
        if !state.accounts.contains_key(&id) {
            return Err(AccountStoreError::AccountNotFound);
        }
        if !state.codes.contains_key(&code_id) {
            return Err(AccountStoreError::UnexpectedError(
                "verification code already consumed".to_string(),
            ));
        }
        state.codes.remove(&code_id);
        if let Some(account) = state.accounts.get_mut(&id) {
            account.activated = true;
        }
        Ok(())
    }

    async fn set_password(
        &self,
        id: Uuid,
        new_password_hash: Secret<String>,
        code_id: Uuid,
    ) -> Result<(), AccountStoreError> {
        let mut state = self.write();
        if !state.accounts.contains_key(&id) {
            return Err(AccountStoreError::AccountNotFound);
        }
        if !state.codes.contains_key(&code_id) {
            return Err(AccountStoreError::UnexpectedError(
                "verification code already consumed".to_string(),
            ));
        }
        state.codes.remove(&code_id);
        if let Some(account) = state.accounts.get_mut(&id) {
            account.password_hash = new_password_hash;
        }
        Ok(())
    }
}

#[async_trait]
impl VerificationCodeStore for InMemoryAuthStore {
    async fn find_by_code(
        &self,
        code: &OtpCode,
    ) -> Result<Option<VerificationCode>, VerificationCodeStoreError> {
        Ok(self
            .read()
            .codes
            .values()
            .find(|c| &c.code == code)
            .cloned())
    }

    async fn find_pending(
        &self,
        account_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<Option<VerificationCode>, VerificationCodeStoreError> {
        Ok(self
            .read()
            .codes
            .values()
            .find(|c| c.account_id == account_id && c.purpose == purpose)
            .cloned())
    }

    async fn upsert(
        &self,
        account_id: Uuid,
        purpose: OtpPurpose,
        code: OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), VerificationCodeStoreError> {
        let mut state = self.write();
        let superseded: Vec<Uuid> = state
            .codes
            .values()
            .filter(|c| c.account_id == account_id && c.purpose == purpose)
            .map(|c| c.id)
            .collect();
        for id in superseded {
            state.codes.remove(&id);
        }
        if state.code_taken(&code) {
            return Err(VerificationCodeStoreError::CodeCollision);
        }
        let fresh = VerificationCode::new(account_id, purpose, code, expires_at);
        state.codes.insert(fresh.id, fresh);
        Ok(())
    }
}

#[async_trait]
impl SessionTokenStore for InMemoryAuthStore {
    async fn add_token(&self, token: SessionToken) -> Result<(), SessionTokenStoreError> {
        self.write().tokens.push(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use otpauth_core::{AccountRole, FullName};
    use secrecy::Secret;

    use super::*;

    fn account(address: &str) -> Account {
        Account::new(
            Email::try_from(Secret::from(address.to_string())).unwrap(),
            FullName::try_from("Test User".to_string()).unwrap(),
            Secret::from("hash".to_string()),
            AccountRole::User,
        )
    }

    fn code_for(account_id: Uuid, purpose: OtpPurpose, value: &str) -> VerificationCode {
        VerificationCode::new(
            account_id,
            purpose,
            OtpCode::parse(value.to_string()).unwrap(),
            Utc::now() + Duration::minutes(3),
        )
    }

    #[tokio::test]
    async fn add_account_rejects_duplicate_emails() {
        let store = InMemoryAuthStore::new();
        let first = account("a@x.com");
        let second = account("a@x.com");
        let code_a = code_for(first.id, OtpPurpose::AccountVerification, "111111");
        let code_b = code_for(second.id, OtpPurpose::AccountVerification, "222222");

        store.add_account(first, code_a).await.unwrap();
        let result = store.add_account(second, code_b).await;
        assert_eq!(result, Err(AccountStoreError::AccountAlreadyExists));
    }

    #[tokio::test]
    async fn add_account_rejects_colliding_code_values() {
        let store = InMemoryAuthStore::new();
        let first = account("a@x.com");
        let second = account("b@x.com");
        let code_a = code_for(first.id, OtpPurpose::AccountVerification, "123456");
        let code_b = code_for(second.id, OtpPurpose::AccountVerification, "123456");

        store.add_account(first, code_a).await.unwrap();
        let result = store.add_account(second.clone(), code_b).await;
        assert_eq!(result, Err(AccountStoreError::CodeCollision));
        // The rejected insert must not leave the account behind either.
        assert!(matches!(
            store.get_account(&second.email).await,
            Err(AccountStoreError::AccountNotFound)
        ));
    }

    #[tokio::test]
    async fn delete_account_cascades_to_codes_and_tokens() {
        let store = InMemoryAuthStore::new();
        let alice = account("a@x.com");
        let alice_id = alice.id;
        let code = code_for(alice_id, OtpPurpose::AccountVerification, "123456");
        let code_value = code.code.clone();
        store.add_account(alice, code).await.unwrap();
        store
            .add_token(SessionToken {
                account_id: alice_id,
                refresh_token: "tok".to_string(),
                expires_at: Utc::now() + Duration::days(365),
            })
            .await
            .unwrap();

        store.delete_account(alice_id).await.unwrap();

        assert!(store.find_by_code(&code_value).await.unwrap().is_none());
        assert_eq!(store.session_token_count(), 0);
    }

    #[tokio::test]
    async fn activate_account_applies_both_halves() {
        let store = InMemoryAuthStore::new();
        let alice = account("a@x.com");
        let alice_id = alice.id;
        let alice_email = alice.email.clone();
        let code = code_for(alice_id, OtpPurpose::AccountVerification, "123456");
        let code_id = code.id;
        let code_value = code.code.clone();
        store.add_account(alice, code).await.unwrap();

        store.activate_account(alice_id, code_id).await.unwrap();

        assert!(store.get_account(&alice_email).await.unwrap().activated);
        assert!(store.find_by_code(&code_value).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn activate_account_applies_nothing_when_the_code_is_gone() {
        let store = InMemoryAuthStore::new();
        let alice = account("a@x.com");
        let alice_id = alice.id;
        let code = code_for(alice_id, OtpPurpose::AccountVerification, "123456");
        let code_id = code.id;
        store.add_account(alice, code).await.unwrap();
        store.activate_account(alice_id, code_id).await.unwrap();

        // Replaying the consumed transition fails and leaves no partial
        // state (the account cannot be "re-activated" off a spent code).
        let replay = store.activate_account(alice_id, code_id).await;
        assert!(matches!(
            replay,
            Err(AccountStoreError::UnexpectedError(_))
        ));
    }

    #[tokio::test]
    async fn set_password_applies_nothing_when_the_code_is_gone() {
        let store = InMemoryAuthStore::new();
        let alice = account("a@x.com");
        let alice_id = alice.id;
        let alice_email = alice.email.clone();
        let code = code_for(alice_id, OtpPurpose::PasswordReset, "654321");
        store.add_account(alice, code).await.unwrap();

        let result = store
            .set_password(
                alice_id,
                Secret::from("new-hash".to_string()),
                Uuid::new_v4(),
            )
            .await;
        assert!(matches!(result, Err(AccountStoreError::UnexpectedError(_))));

        use secrecy::ExposeSecret;
        let stored = store.get_account(&alice_email).await.unwrap();
        assert_eq!(stored.password_hash.expose_secret(), "hash");
    }

    #[tokio::test]
    async fn upsert_replaces_the_previous_row_for_the_pair() {
        let store = InMemoryAuthStore::new();
        let alice = account("a@x.com");
        let alice_id = alice.id;
        store.seed_account(alice);

        let first = OtpCode::parse("111111".to_string()).unwrap();
        let second = OtpCode::parse("222222".to_string()).unwrap();
        store
            .upsert(
                alice_id,
                OtpPurpose::PasswordReset,
                first.clone(),
                Utc::now() + Duration::minutes(3),
            )
            .await
            .unwrap();
        store
            .upsert(
                alice_id,
                OtpPurpose::PasswordReset,
                second.clone(),
                Utc::now() + Duration::minutes(3),
            )
            .await
            .unwrap();

        assert!(store.find_by_code(&first).await.unwrap().is_none());
        let pending = store
            .find_pending(alice_id, OtpPurpose::PasswordReset)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pending.code, second);
    }

    #[tokio::test]
    async fn upsert_keeps_purposes_independent() {
        let store = InMemoryAuthStore::new();
        let alice = account("a@x.com");
        let alice_id = alice.id;
        store.seed_account(alice);

        let verify = OtpCode::parse("111111".to_string()).unwrap();
        let reset = OtpCode::parse("222222".to_string()).unwrap();
        store
            .upsert(
                alice_id,
                OtpPurpose::AccountVerification,
                verify.clone(),
                Utc::now() + Duration::minutes(3),
            )
            .await
            .unwrap();
        store
            .upsert(
                alice_id,
                OtpPurpose::PasswordReset,
                reset.clone(),
                Utc::now() + Duration::minutes(3),
            )
            .await
            .unwrap();

        assert!(store.find_by_code(&verify).await.unwrap().is_some());
        assert!(store.find_by_code(&reset).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn upsert_rejects_a_code_live_on_another_account() {
        let store = InMemoryAuthStore::new();
        let alice = account("a@x.com");
        let bob = account("b@x.com");
        let alice_id = alice.id;
        let bob_id = bob.id;
        store.seed_account(alice);
        store.seed_account(bob);

        let code = OtpCode::parse("123456".to_string()).unwrap();
        store
            .upsert(
                alice_id,
                OtpPurpose::PasswordReset,
                code.clone(),
                Utc::now() + Duration::minutes(3),
            )
            .await
            .unwrap();

        let result = store
            .upsert(
                bob_id,
                OtpPurpose::PasswordReset,
                code,
                Utc::now() + Duration::minutes(3),
            )
            .await;
        assert_eq!(result, Err(VerificationCodeStoreError::CodeCollision));
    }
}
