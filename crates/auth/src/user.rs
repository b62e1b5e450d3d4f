//! User accounts and lockout bookkeeping.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use supplydesk_core::{Entity, UserId};

use crate::{Role, UserClaim};

// ─────────────────────────────────────────────────────────────────────────────
// Lockout Policy
// ─────────────────────────────────────────────────────────────────────────────

/// How many consecutive failed logins lock an account, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_failed_attempts: u32,
    pub duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            duration: Duration::minutes(5),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User Account
// ─────────────────────────────────────────────────────────────────────────────

/// A credential holder.
///
/// # Invariants
/// - `email` is stored normalized (see [`normalize_email`]) and is unique.
/// - `password_hash` is an Argon2id PHC string, never plaintext.
/// - `access_failed_count` stays below the policy threshold; reaching it
///   converts into `lockout_end` and the counter starts over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub claims: Vec<UserClaim>,
    pub roles: Vec<Role>,
    pub lockout_enabled: bool,
    pub access_failed_count: u32,
    pub lockout_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn new(email: &str, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            email: normalize_email(email),
            password_hash,
            claims: Vec::new(),
            roles: Vec::new(),
            lockout_enabled: true,
            access_failed_count: 0,
            lockout_end: None,
            created_at: now,
        }
    }

    pub fn is_locked_out(&self, now: DateTime<Utc>) -> bool {
        self.lockout_enabled && self.lockout_end.is_some_and(|end| end > now)
    }

    /// Count one failed login.
    ///
    /// Returns `true` when this attempt reached the threshold or the account
    /// was already locked. Stores apply this under their own row lock.
    pub fn record_failed_attempt(&mut self, policy: &LockoutPolicy, now: DateTime<Utc>) -> bool {
        if !self.lockout_enabled {
            return false;
        }

        let already_locked = self.is_locked_out(now);
        self.access_failed_count += 1;
        if self.access_failed_count < policy.max_failed_attempts {
            return already_locked;
        }

        self.lockout_end = Some(now + policy.duration);
        self.access_failed_count = 0;
        true
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    /// Forget earlier failures after a successful login.
    ///
    /// Returns `true` if anything changed (callers persist only then).
    pub fn reset_failures(&mut self) -> bool {
        if self.access_failed_count == 0 && self.lockout_end.is_none() {
            return false;
        }
        self.access_failed_count = 0;
        self.lockout_end = None;
        true
    }

    pub fn has_claim(&self, claim: &UserClaim) -> bool {
        self.claims
            .iter()
            .any(|c| c.is_type(&claim.claim_type) && c.value == claim.value)
    }
}

impl Entity for UserAccount {
    type Id = UserId;
    const NAME: &'static str = "user";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Canonical form used for storage and lookup: trimmed, lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
