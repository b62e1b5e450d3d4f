//! Identity service: registration, login with lockout, claim grants.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use supplydesk_core::check;

use crate::password::{hash_password_blocking, verify_password_blocking};
use crate::{
    AuthError, IdentityError, IdentitySettings, IssuedToken, LoginUser, RegisterUser, Role,
    StoreError, TokenIssuer, UserAccount, UserClaim, UserStore, normalize_email,
};

/// Generic over the credential store so the auth layer has no dependency on
/// the database crate.
pub struct IdentityService<S: UserStore> {
    store: S,
    tokens: TokenIssuer,
    settings: IdentitySettings,
}

impl<S: UserStore> IdentityService<S> {
    pub fn new(store: S, settings: IdentitySettings) -> Self {
        let tokens = TokenIssuer::new(settings.jwt.clone());
        Self {
            store,
            tokens,
            settings,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Create an account and sign it in.
    #[instrument(skip(self, input), fields(email = %input.email), err)]
    pub async fn register(&self, input: RegisterUser) -> Result<IssuedToken, AuthError> {
        check(&input)?;

        let email = normalize_email(&input.email);
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::Rejected(vec![IdentityError::duplicate_email(&email)]));
        }

        let account = self.new_account(&email, &input.password).await?;
        self.store.create(&account).await.map_err(|e| match e {
            StoreError::DuplicateEmail(_) => {
                AuthError::Rejected(vec![IdentityError::duplicate_email(&email)])
            }
            other => other.into(),
        })?;

        info!(user_id = %account.id, "account registered");
        Ok(self.tokens.issue(&account, Utc::now())?)
    }

    /// Check credentials and issue a token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    /// A locked account is refused before the password is looked at.
    #[instrument(skip(self, input), fields(email = %input.email), err)]
    pub async fn login(&self, input: LoginUser) -> Result<IssuedToken, AuthError> {
        check(&input)?;

        let email = normalize_email(&input.email);
        let Some(mut account) = self.store.find_by_email(&email).await? else {
            debug!("unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let now = Utc::now();
        if account.is_locked_out(now) {
            return Err(AuthError::AccountLocked);
        }

        let verified =
            verify_password_blocking(input.password, account.password_hash.clone()).await?;
        if verified {
            if account.reset_failures() {
                self.store.reset_failures(account.id).await?;
            }
            debug!(user_id = %account.id, "login succeeded");
            return Ok(self.tokens.issue(&account, now)?);
        }

        let locked = self
            .store
            .record_failure(account.id, &self.settings.lockout, now)
            .await?;

        if locked {
            warn!(user_id = %account.id, "account locked after repeated failures");
            Err(AuthError::AccountLocked)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Grant `claim` to the account registered under `email`.
    #[instrument(skip(self), err)]
    pub async fn grant_claim(&self, email: &str, claim: UserClaim) -> Result<(), AuthError> {
        let account = self
            .store
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(StoreError::NotFound)?;

        if !account.has_claim(&claim) {
            self.store.add_claim(account.id, &claim).await?;
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn grant_role(&self, email: &str, role: Role) -> Result<(), AuthError> {
        let account = self
            .store
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(StoreError::NotFound)?;

        if !account.has_role(&role) {
            self.store.add_role(account.id, &role).await?;
        }
        Ok(())
    }

    /// Make sure an account exists under `email` and holds every claim in
    /// `claims`. An existing account keeps its password.
    #[instrument(skip(self, password, claims), err)]
    pub async fn ensure_account(
        &self,
        email: &str,
        password: &str,
        claims: &[UserClaim],
    ) -> Result<UserAccount, AuthError> {
        let email = normalize_email(email);

        let mut account = match self.store.find_by_email(&email).await? {
            Some(existing) => existing,
            None => {
                let account = self.new_account(&email, password).await?;
                self.store.create(&account).await?;
                info!(user_id = %account.id, "account created");
                account
            }
        };

        for claim in claims {
            if !account.has_claim(claim) {
                self.store.add_claim(account.id, claim).await?;
                account.claims.push(claim.clone());
            }
        }
        Ok(account)
    }

    async fn new_account(&self, email: &str, password: &str) -> Result<UserAccount, AuthError> {
        let broken = self.settings.password.check(password);
        if !broken.is_empty() {
            return Err(AuthError::Rejected(broken));
        }
        let hash = hash_password_blocking(password.to_string()).await?;
        Ok(UserAccount::new(email, hash, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::DateTime;
    use supplydesk_core::UserId;

    use super::*;
    use crate::LockoutPolicy;

    #[derive(Default)]
    struct FakeStore {
        users: Mutex<HashMap<String, UserAccount>>,
    }

    impl FakeStore {
        fn by_id<R>(
            &self,
            id: UserId,
            f: impl FnOnce(&mut UserAccount) -> R,
        ) -> Result<R, StoreError> {
            let mut users = self.users.lock().unwrap();
            let account = users
                .values_mut()
                .find(|u| u.id == id)
                .ok_or(StoreError::NotFound)?;
            Ok(f(account))
        }
    }

    #[async_trait]
    impl UserStore for FakeStore {
        async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
            Ok(self.users.lock().unwrap().get(email).cloned())
        }

        async fn create(&self, account: &UserAccount) -> Result<(), StoreError> {
            let mut users = self.users.lock().unwrap();
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
            self.by_id(user_id, |u| u.record_failed_attempt(policy, now))
        }

        async fn reset_failures(&self, user_id: UserId) -> Result<(), StoreError> {
            self.by_id(user_id, |u| {
                u.reset_failures();
            })
        }

        async fn add_claim(&self, user_id: UserId, claim: &UserClaim) -> Result<(), StoreError> {
            self.by_id(user_id, |u| u.claims.push(claim.clone()))
        }

        async fn add_role(&self, user_id: UserId, role: &Role) -> Result<(), StoreError> {
            self.by_id(user_id, |u| u.roles.push(role.clone()))
        }
    }

    fn service() -> IdentityService<FakeStore> {
        let mut settings = IdentitySettings::default();
        settings.jwt.secret = "unit-test-secret".into();
        IdentityService::new(FakeStore::default(), settings)
    }

    fn register(email: &str, password: &str) -> RegisterUser {
        RegisterUser {
            email: email.into(),
            password: password.into(),
            confirm_password: password.into(),
        }
    }

    fn login(email: &str, password: &str) -> LoginUser {
        LoginUser {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let svc = service();
        let issued = svc.register(register("Buyer@Example.com", "Secret#1")).await.unwrap();
        assert_eq!(issued.user_token.email, "buyer@example.com");
        assert!(svc.tokens().validate(&issued.access_token).is_ok());

        let again = svc.login(login("buyer@example.com", "Secret#1")).await.unwrap();
        assert_eq!(again.user_token.id, issued.user_token.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let svc = service();
        svc.register(register("a@a.com", "Secret#1")).await.unwrap();

        match svc.register(register("A@A.com", "Secret#1")).await {
            Err(AuthError::Rejected(errors)) => assert_eq!(errors[0].code, "DuplicateEmail"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn weak_password_is_rejected_by_policy() {
        let svc = service();
        match svc.register(register("a@a.com", "secret")).await {
            Err(AuthError::Rejected(errors)) => {
                let codes: Vec<_> = errors.iter().map(|e| e.code).collect();
                assert!(codes.contains(&"PasswordRequiresDigit"));
                assert!(codes.contains(&"PasswordRequiresUpper"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_registration_fails_validation() {
        let svc = service();
        let mut input = register("nope", "Secret#1");
        input.confirm_password = "Other#1".into();
        match svc.register(input).await {
            Err(AuthError::Validation(fields)) => {
                assert!(fields.contains("email"));
                assert!(fields.contains("confirm_password"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_the_same() {
        let svc = service();
        svc.register(register("a@a.com", "Secret#1")).await.unwrap();

        assert!(matches!(
            svc.login(login("b@b.com", "Secret#1")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.login(login("a@a.com", "wrong")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn fifth_failure_locks_the_account() {
        let svc = service();
        svc.register(register("a@a.com", "Secret#1")).await.unwrap();

        for _ in 0..4 {
            assert!(matches!(
                svc.login(login("a@a.com", "wrong")).await,
                Err(AuthError::InvalidCredentials)
            ));
        }
        assert!(matches!(
            svc.login(login("a@a.com", "wrong")).await,
            Err(AuthError::AccountLocked)
        ));
        // Correct password no longer helps while locked.
        assert!(matches!(
            svc.login(login("a@a.com", "Secret#1")).await,
            Err(AuthError::AccountLocked)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_failures_are_all_counted() {
        let svc = Arc::new(service());
        svc.register(register("a@a.com", "Secret#1")).await.unwrap();

        let attempts: Vec<_> = (0..8)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.login(login("a@a.com", "wrong")).await })
            })
            .collect();

        let mut locked = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Err(AuthError::AccountLocked) => locked += 1,
                Err(AuthError::InvalidCredentials) => {}
                other => panic!("unexpected login outcome: {other:?}"),
            }
        }
        assert!(locked >= 1);
        assert!(matches!(
            svc.login(login("a@a.com", "Secret#1")).await,
            Err(AuthError::AccountLocked)
        ));
    }

    #[tokio::test]
    async fn success_resets_failure_count() {
        let svc = service();
        svc.register(register("a@a.com", "Secret#1")).await.unwrap();

        for _ in 0..4 {
            let _ = svc.login(login("a@a.com", "wrong")).await;
        }
        svc.login(login("a@a.com", "Secret#1")).await.unwrap();

        let stored = svc.store.find_by_email("a@a.com").await.unwrap().unwrap();
        assert_eq!(stored.access_failed_count, 0);
        assert!(matches!(
            svc.login(login("a@a.com", "wrong")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn expired_lockout_allows_login_again() {
        let mut settings = IdentitySettings::default();
        settings.jwt.secret = "unit-test-secret".into();
        settings.lockout = LockoutPolicy {
            max_failed_attempts: 1,
            duration: chrono::Duration::zero(),
        };
        let svc = IdentityService::new(FakeStore::default(), settings);
        svc.register(register("a@a.com", "Secret#1")).await.unwrap();

        assert!(matches!(
            svc.login(login("a@a.com", "wrong")).await,
            Err(AuthError::AccountLocked)
        ));
        assert!(svc.login(login("a@a.com", "Secret#1")).await.is_ok());
    }

    #[tokio::test]
    async fn granted_claim_appears_in_next_token() {
        let svc = service();
        svc.register(register("a@a.com", "Secret#1")).await.unwrap();
        let claim = UserClaim::new("AdicionarFornecedor", "true");

        svc.grant_claim("a@a.com", claim.clone()).await.unwrap();
        svc.grant_claim("a@a.com", claim.clone()).await.unwrap();

        let issued = svc.login(login("a@a.com", "Secret#1")).await.unwrap();
        assert_eq!(issued.user_token.claims, vec![claim]);
    }

    #[tokio::test]
    async fn ensure_account_is_idempotent() {
        let svc = service();
        let claims = [
            UserClaim::new("AdicionarFornecedor", "true"),
            UserClaim::new("ExcluirFornecedor", "true"),
        ];

        let first = svc.ensure_account("admin@a.com", "Admin#123", &claims).await.unwrap();
        let second = svc.ensure_account("admin@a.com", "Other#123", &claims).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.claims.len(), 2);

        // Original password still works.
        assert!(svc.login(login("admin@a.com", "Admin#123")).await.is_ok());
    }

    #[tokio::test]
    async fn granted_role_is_stored_once() {
        let svc = service();
        svc.register(register("a@a.com", "Secret#1")).await.unwrap();

        svc.grant_role("a@a.com", Role::new("admin")).await.unwrap();
        svc.grant_role("a@a.com", Role::new("admin")).await.unwrap();

        let issued = svc.login(login("a@a.com", "Secret#1")).await.unwrap();
        assert_eq!(issued.user_token.roles, vec![Role::new("admin")]);
    }

    #[tokio::test]
    async fn granting_to_unknown_account_fails() {
        let svc = service();
        let err = svc
            .grant_claim("ghost@a.com", UserClaim::new("AdicionarFornecedor", "true"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Store(StoreError::NotFound)));
    }
}
