//! HS256 access token issuance and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use supplydesk_core::UserId;

use crate::{
    JwtClaims, JwtSettings, Role, TokenValidationError, UserAccount, UserClaim, validate_claims,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error(transparent)]
    Window(#[from] TokenValidationError),

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Invalid(e.to_string()),
        }
    }
}

/// Account summary returned next to the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserToken {
    pub id: UserId,
    pub email: String,
    pub claims: Vec<UserClaim>,
    pub roles: Vec<Role>,
}

/// Response body of a successful registration or login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
    pub expires_at: DateTime<Utc>,
    pub user_token: UserToken,
}

/// Signs and verifies tokens with one shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    settings: JwtSettings,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    pub fn new(settings: JwtSettings) -> Self {
        let encoding = EncodingKey::from_secret(settings.secret.as_bytes());
        let decoding = DecodingKey::from_secret(settings.secret.as_bytes());
        Self {
            settings,
            encoding,
            decoding,
        }
    }

    pub fn issue(
        &self,
        account: &UserAccount,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let lifetime = Duration::hours(i64::from(self.settings.expiration_hours));
        let expires_at = now + lifetime;

        let claims = JwtClaims {
            sub: account.id,
            email: account.email.clone(),
            jti: Uuid::new_v4(),
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
            claims: account.claims.clone(),
            roles: account.roles.clone(),
        };

        let header = Header::new(Algorithm::HS256);
        let access_token = jsonwebtoken::encode(&header, &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            access_token,
            expires_in: lifetime.num_seconds().unsigned_abs(),
            expires_at,
            user_token: UserToken {
                id: account.id,
                email: account.email.clone(),
                claims: account.claims.clone(),
                roles: account.roles.clone(),
            },
        })
    }

    /// Verify signature, issuer, audience and time window.
    pub fn validate(&self, token: &str) -> Result<JwtClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.settings.issuer]);
        validation.set_audience(&[&self.settings.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_nbf = true;

        let claims = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)?.claims;
        validate_claims(&claims, Utc::now())?;
        Ok(claims)
    }
}

impl core::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
