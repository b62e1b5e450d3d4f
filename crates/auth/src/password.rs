//! Password hashing (Argon2id) and complexity policy.

use std::collections::HashSet;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::{AuthError, IdentityError};

/// Hash a plaintext password into an Argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Crypto(format!("hash error: {e}")))
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::Crypto)` if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

/// [`hash_password`] on the blocking pool, off the async workers.
pub async fn hash_password_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Crypto(format!("hashing task failed: {e}")))?
}

/// [`verify_password`] on the blocking pool, off the async workers.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Crypto(format!("verify task failed: {e}")))?
}

/// Complexity rules applied when an account is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub required_unique_chars: usize,
    pub require_non_alphanumeric: bool,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            required_unique_chars: 1,
            require_non_alphanumeric: true,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
        }
    }
}

impl PasswordPolicy {
    /// Every rule `password` breaks, in a stable order. Empty means acceptable.
    pub fn check(&self, password: &str) -> Vec<IdentityError> {
        let mut errors = Vec::new();

        if password.chars().count() < self.min_length {
            errors.push(IdentityError::new(
                "PasswordTooShort",
                format!("Passwords must be at least {} characters.", self.min_length),
            ));
        }
        if self.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
            errors.push(IdentityError::new(
                "PasswordRequiresNonAlphanumeric",
                "Passwords must have at least one non alphanumeric character.",
            ));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(IdentityError::new(
                "PasswordRequiresDigit",
                "Passwords must have at least one digit ('0'-'9').",
            ));
        }
        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            errors.push(IdentityError::new(
                "PasswordRequiresLower",
                "Passwords must have at least one lowercase ('a'-'z').",
            ));
        }
        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            errors.push(IdentityError::new(
                "PasswordRequiresUpper",
                "Passwords must have at least one uppercase ('A'-'Z').",
            ));
        }
        let unique = password.chars().collect::<HashSet<_>>().len();
        if unique < self.required_unique_chars {
            errors.push(IdentityError::new(
                "PasswordRequiresUniqueChars",
                format!(
                    "Passwords must use at least {} different characters.",
                    self.required_unique_chars
                ),
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(errors: &[IdentityError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("Hunter#2").unwrap();
        assert!(verify_password("Hunter#2", &hash).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("Hunter#2").unwrap();
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash_password("Hunter#2").unwrap(), hash_password("Hunter#2").unwrap());
    }

    #[test]
    fn malformed_hash_returns_error() {
        assert!(matches!(verify_password("pw", "not-a-hash"), Err(AuthError::Crypto(_))));
    }

    #[test]
    fn strong_password_passes_default_policy() {
        assert!(PasswordPolicy::default().check("Secret#1").is_empty());
    }

    #[test]
    fn every_broken_rule_is_listed() {
        let errors = PasswordPolicy::default().check("abc");
        assert_eq!(
            codes(&errors),
            [
                "PasswordTooShort",
                "PasswordRequiresNonAlphanumeric",
                "PasswordRequiresDigit",
                "PasswordRequiresUpper",
            ]
        );
    }

    #[test]
    fn relaxed_policy_only_checks_length() {
        let relaxed = PasswordPolicy {
            min_length: 4,
            required_unique_chars: 1,
            require_non_alphanumeric: false,
            require_digit: false,
            require_lowercase: false,
            require_uppercase: false,
        };
        assert!(relaxed.check("aaaa").is_empty());
        assert_eq!(codes(&relaxed.check("aaa")), ["PasswordTooShort"]);
    }

    #[test]
    fn unique_char_rule() {
        let policy = PasswordPolicy {
            required_unique_chars: 3,
            ..PasswordPolicy::default()
        };
        assert!(codes(&policy.check("Aa1#Aa1#")).is_empty());

        let stricter = PasswordPolicy {
            required_unique_chars: 5,
            ..policy
        };
        assert_eq!(codes(&stricter.check("Aa1#Aa1#")), ["PasswordRequiresUniqueChars"]);
    }

    #[tokio::test]
    async fn blocking_pool_variants_agree_with_direct_calls() {
        let hash = hash_password_blocking("Hunter#2".into()).await.unwrap();
        assert!(verify_password_blocking("Hunter#2".into(), hash.clone()).await.unwrap());
        assert!(!verify_password_blocking("wrong".into(), hash).await.unwrap());
    }
}
