use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use supplydesk_auth::{LockoutPolicy, Role, StoreError, UserAccount, UserClaim, UserStore};
use supplydesk_core::UserId;

/// In-memory credential store for tests/dev, keyed by normalized email.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserAccount>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on the account under the write lock.
    fn update<R>(
        &self,
        id: UserId,
        f: impl FnOnce(&mut UserAccount) -> R,
    ) -> Result<R, StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        let account = users
            .values_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        Ok(f(account))
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("user table lock poisoned".into())
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(email).cloned())
    }

    async fn create(&self, account: &UserAccount) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if users.contains_key(&account.email) {
            return Err(StoreError::DuplicateEmail(account.email.clone()));
        }
        users.insert(account.email.clone(), account.clone());
        Ok(())
    }

    async fn record_failure(
        &self,
        user_id: UserId,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.update(user_id, |u| u.record_failed_attempt(policy, now))
    }

    async fn reset_failures(&self, user_id: UserId) -> Result<(), StoreError> {
        self.update(user_id, |u| {
            u.reset_failures();
        })
    }

    async fn add_claim(&self, user_id: UserId, claim: &UserClaim) -> Result<(), StoreError> {
        self.update(user_id, |u| {
            if !u.has_claim(claim) {
                u.claims.push(claim.clone());
            }
        })
    }

    async fn add_role(&self, user_id: UserId, role: &Role) -> Result<(), StoreError> {
        self.update(user_id, |u| {
            if !u.has_role(role) {
                u.roles.push(role.clone());
            }
        })
    }
}
