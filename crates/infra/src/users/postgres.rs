//! Postgres-backed credential store (`users`, `user_claims`, `user_roles`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use supplydesk_auth::{LockoutPolicy, Role, StoreError, UserAccount, UserClaim, UserStore};
use supplydesk_core::UserId;

use crate::db::{UNIQUE_VIOLATION, sqlstate};

const FOREIGN_KEY_VIOLATION: &str = "23503";

const INSERT_CLAIM: &str = r#"
    INSERT INTO user_claims (user_id, claim_type, claim_value)
    VALUES ($1, $2, $3)
    ON CONFLICT DO NOTHING
"#;

const INSERT_ROLE: &str = r#"
    INSERT INTO user_roles (user_id, role)
    VALUES ($1, $2)
    ON CONFLICT DO NOTHING
"#;

/// One failed login, applied to the locked current row.
///
/// `prev` holds the values before the update; `$2` is the threshold, `$3`
/// the lockout end to set when it is reached and `$4` is "now". Mirrors
/// `UserAccount::record_failed_attempt`.
const RECORD_FAILURE: &str = r#"
    WITH prev AS (
        SELECT id, lockout_enabled, access_failed_count, lockout_end
        FROM users
        WHERE id = $1
        FOR UPDATE
    )
    UPDATE users AS u
    SET access_failed_count = CASE
            WHEN NOT prev.lockout_enabled THEN prev.access_failed_count
            WHEN prev.access_failed_count + 1 >= $2 THEN 0
            ELSE prev.access_failed_count + 1
        END,
        lockout_end = CASE
            WHEN prev.lockout_enabled AND prev.access_failed_count + 1 >= $2 THEN $3
            ELSE prev.lockout_end
        END
    FROM prev
    WHERE u.id = prev.id
    RETURNING prev.lockout_enabled
        AND (prev.access_failed_count + 1 >= $2 OR COALESCE(prev.lockout_end > $4, FALSE))
        AS locked
"#;

#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_claims(&self, user_id: Uuid) -> Result<Vec<UserClaim>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT claim_type, claim_value
            FROM user_claims
            WHERE user_id = $1
            ORDER BY claim_type, claim_value
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_claims", e))?;

        rows.iter()
            .map(|r| {
                Ok(UserClaim::new(
                    r.try_get::<String, _>("claim_type").map_err(corrupt)?,
                    r.try_get::<String, _>("claim_value").map_err(corrupt)?,
                ))
            })
            .collect()
    }

    async fn load_roles(&self, user_id: Uuid) -> Result<Vec<Role>, StoreError> {
        let rows = sqlx::query("SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_roles", e))?;

        rows.iter()
            .map(|r| Ok(Role::new(r.try_get::<String, _>("role").map_err(corrupt)?)))
            .collect()
    }
}

fn corrupt(e: sqlx::Error) -> StoreError {
    StoreError::Corrupt(e.to_string())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match sqlstate(&err).as_deref() {
        Some(FOREIGN_KEY_VIOLATION) => StoreError::NotFound,
        _ => StoreError::Unavailable(format!("sqlx error in {operation}: {err}")),
    }
}

fn account_from_row(row: &PgRow) -> Result<UserAccount, StoreError> {
    let failed: i32 = row.try_get("access_failed_count").map_err(corrupt)?;
    Ok(UserAccount {
        id: UserId::from_uuid(row.try_get("id").map_err(corrupt)?),
        email: row.try_get("email").map_err(corrupt)?,
        password_hash: row.try_get("password_hash").map_err(corrupt)?,
        claims: Vec::new(),
        roles: Vec::new(),
        lockout_enabled: row.try_get("lockout_enabled").map_err(corrupt)?,
        access_failed_count: u32::try_from(failed)
            .map_err(|_| StoreError::Corrupt(format!("negative access_failed_count {failed}")))?,
        lockout_end: row.try_get::<Option<DateTime<Utc>>, _>("lockout_end").map_err(corrupt)?,
        created_at: row.try_get("created_at").map_err(corrupt)?,
    })
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, lockout_enabled,
                   access_failed_count, lockout_end, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut account = account_from_row(&row)?;
        account.claims = self.load_claims(*account.id.as_uuid()).await?;
        account.roles = self.load_roles(*account.id.as_uuid()).await?;
        Ok(Some(account))
    }

    #[instrument(skip(self, account), fields(user_id = %account.id), err)]
    async fn create(&self, account: &UserAccount) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_create_user", e))?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, password_hash, lockout_enabled,
                access_failed_count, lockout_end, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.lockout_enabled)
        .bind(i32::try_from(account.access_failed_count).unwrap_or(i32::MAX))
        .bind(account.lockout_end)
        .bind(account.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if sqlstate(&e).as_deref() == Some(UNIQUE_VIOLATION) {
                StoreError::DuplicateEmail(account.email.clone())
            } else {
                map_sqlx_error("insert_user", e)
            }
        })?;

        for claim in &account.claims {
            sqlx::query(INSERT_CLAIM)
                .bind(account.id.as_uuid())
                .bind(&claim.claim_type)
                .bind(&claim.value)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_user_claim", e))?;
        }

        for role in &account.roles {
            sqlx::query(INSERT_ROLE)
                .bind(account.id.as_uuid())
                .bind(role.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_user_role", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_create_user", e))
    }

    #[instrument(skip(self, policy), fields(user_id = %user_id), err)]
    async fn record_failure(
        &self,
        user_id: UserId,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let row = sqlx::query(RECORD_FAILURE)
            .bind(user_id.as_uuid())
            .bind(i32::try_from(policy.max_failed_attempts).unwrap_or(i32::MAX))
            .bind(now + policy.duration)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("record_failure", e))?
            .ok_or(StoreError::NotFound)?;

        row.try_get("locked").map_err(corrupt)
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn reset_failures(&self, user_id: UserId) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET access_failed_count = 0, lockout_end = NULL WHERE id = $1",
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("reset_failures", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn add_claim(&self, user_id: UserId, claim: &UserClaim) -> Result<(), StoreError> {
        sqlx::query(INSERT_CLAIM)
            .bind(user_id.as_uuid())
            .bind(&claim.claim_type)
            .bind(&claim.value)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("add_claim", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn add_role(&self, user_id: UserId, role: &Role) -> Result<(), StoreError> {
        sqlx::query(INSERT_ROLE)
            .bind(user_id.as_uuid())
            .bind(role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("add_role", e))?;
        Ok(())
    }
}
