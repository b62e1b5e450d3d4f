use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use supplydesk_core::UserId;

use crate::{LockoutPolicy, Role, UserAccount, UserClaim};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    #[error("email '{0}' is already taken")]
    DuplicateEmail(String),

    #[error("user not found")]
    NotFound,

    #[error("stored user could not be decoded: {0}")]
    Corrupt(String),
}

/// Credential store.
///
/// Emails passed in are already normalized. Implementations live in
/// `supplydesk-infra`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError>;

    /// Insert a new account with its claims and roles.
    ///
    /// Fails with [`StoreError::DuplicateEmail`] if the email is taken.
    async fn create(&self, account: &UserAccount) -> Result<(), StoreError>;

    /// Count one failed login for `user_id` as a single atomic step.
    ///
    /// Applies [`UserAccount::record_failed_attempt`] to the stored row, not
    /// to a copy read earlier, so concurrent failures are all counted.
    /// Returns `true` when the account is locked afterwards.
    async fn record_failure(
        &self,
        user_id: UserId,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Clear the failure counter and any lockout.
    async fn reset_failures(&self, user_id: UserId) -> Result<(), StoreError>;

    /// Idempotent: granting a claim the user already holds is a no-op.
    async fn add_claim(&self, user_id: UserId, claim: &UserClaim) -> Result<(), StoreError>;

    async fn add_role(&self, user_id: UserId, role: &Role) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        (**self).find_by_email(email).await
    }

    async fn create(&self, account: &UserAccount) -> Result<(), StoreError> {
        (**self).create(account).await
    }

    async fn record_failure(
        &self,
        user_id: UserId,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        (**self).record_failure(user_id, policy, now).await
    }

    async fn reset_failures(&self, user_id: UserId) -> Result<(), StoreError> {
        (**self).reset_failures(user_id).await
    }

    async fn add_claim(&self, user_id: UserId, claim: &UserClaim) -> Result<(), StoreError> {
        (**self).add_claim(user_id, claim).await
    }

    async fn add_role(&self, user_id: UserId, role: &Role) -> Result<(), StoreError> {
        (**self).add_role(user_id, role).await
    }
}
