//! Identity configuration.

use crate::{LockoutPolicy, PasswordPolicy};

/// Token signing settings.
#[derive(Clone)]
pub struct JwtSettings {
    /// HS256 shared secret.
    pub secret: String,
    /// `iss` claim written into, and required from, every token.
    pub issuer: String,
    /// `aud` claim written into, and required from, every token.
    pub audience: String,
    /// Token lifetime in hours (default: 2).
    pub expiration_hours: u32,
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "supplydesk".into(),
            audience: "https://localhost".into(),
            expiration_hours: 2,
        }
    }
}

impl core::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

/// Everything the identity service needs, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct IdentitySettings {
    pub jwt: JwtSettings,
    pub lockout: LockoutPolicy,
    pub password: PasswordPolicy,
}
