//! Postgres pool and schema.

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::DatabaseSettings;

/// Open a connection pool.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.url)
        .await
        .context("failed to connect to Postgres")
}

const SCHEMA: &[(&str, &str)] = &[
    (
        "suppliers",
        r#"
        CREATE TABLE IF NOT EXISTS suppliers (
            id        UUID PRIMARY KEY,
            name      TEXT    NOT NULL,
            document  TEXT    NOT NULL,
            active    BOOLEAN NOT NULL
        )
        "#,
    ),
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id                   UUID PRIMARY KEY,
            email                VARCHAR(256) NOT NULL UNIQUE,
            password_hash        TEXT         NOT NULL,
            lockout_enabled      BOOLEAN      NOT NULL DEFAULT TRUE,
            access_failed_count  INTEGER      NOT NULL DEFAULT 0,
            lockout_end          TIMESTAMPTZ  NULL,
            created_at           TIMESTAMPTZ  NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "user_claims",
        r#"
        CREATE TABLE IF NOT EXISTS user_claims (
            user_id      UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            claim_type   VARCHAR(256) NOT NULL,
            claim_value  VARCHAR(256) NOT NULL,
            PRIMARY KEY (user_id, claim_type, claim_value)
        )
        "#,
    ),
    (
        "user_roles",
        r#"
        CREATE TABLE IF NOT EXISTS user_roles (
            user_id  UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            role     VARCHAR(256) NOT NULL,
            PRIMARY KEY (user_id, role)
        )
        "#,
    ),
];

/// Create the tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for (table, ddl) in SCHEMA {
        sqlx::query(*ddl)
            .execute(pool)
            .await
            .with_context(|| format!("failed to create {table} table"))?;
    }
    tracing::info!("database schema ready");
    Ok(())
}

/// Postgres `SQLSTATE` of a database error, if any.
pub(crate) fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}

pub(crate) const UNIQUE_VIOLATION: &str = "23505";
