//! Configuration loading from environment variables.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use chrono::Duration;
use supplydesk_auth::{IdentitySettings, JwtSettings, LockoutPolicy, PasswordPolicy};

const DEV_JWT_SECRET: &str = "dev-secret";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub http_addr: SocketAddr,
    /// `None` runs on in-memory stores (data is lost on restart).
    pub database: Option<DatabaseSettings>,
    pub identity: IdentitySettings,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

/// Account seeded at startup with every supplier claim.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Settings {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` (tests pass a map here).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_addr = var("HTTP_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid HTTP_ADDR")?;

        let database = match var("DATABASE_URL") {
            Some(url) => Some(DatabaseSettings {
                url,
                max_connections: parse_or(var("DATABASE_MAX_CONNECTIONS"), 10)
                    .context("Invalid DATABASE_MAX_CONNECTIONS")?,
            }),
            None => None,
        };

        let secret = var("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });
        let defaults = JwtSettings::default();
        let jwt = JwtSettings {
            secret,
            issuer: var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            expiration_hours: parse_or(var("JWT_EXPIRATION_HOURS"), defaults.expiration_hours)
                .context("Invalid JWT_EXPIRATION_HOURS")?,
        };

        let lockout_defaults = LockoutPolicy::default();
        let lockout = LockoutPolicy {
            max_failed_attempts: parse_or(
                var("LOCKOUT_MAX_FAILED_ATTEMPTS"),
                lockout_defaults.max_failed_attempts,
            )
            .context("Invalid LOCKOUT_MAX_FAILED_ATTEMPTS")?,
            duration: match var("LOCKOUT_DURATION_SECS") {
                Some(secs) => {
                    Duration::seconds(secs.parse().context("Invalid LOCKOUT_DURATION_SECS")?)
                }
                None => lockout_defaults.duration,
            },
        };

        let admin_email = var("BOOTSTRAP_ADMIN_EMAIL");
        let admin_password = var("BOOTSTRAP_ADMIN_PASSWORD");
        let bootstrap_admin = match (admin_email, admin_password) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            _ => anyhow::bail!(
                "BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together"
            ),
        };

        Ok(Self {
            http_addr,
            database,
            identity: IdentitySettings {
                jwt,
                lockout,
                password: PasswordPolicy::default(),
            },
            bootstrap_admin,
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => Ok(v.trim().parse()?),
        None => Ok(default),
    }
}
