//! Postgres-backed supplier table.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError |
//! |------------|----------------------|-----------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Unavailable` |
//! | ColumnDecode / Decode | N/A | `Corrupt` |
//! | Other | N/A | `Unavailable` |

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use supplydesk_core::{RowsAffected, SupplierId};
use supplydesk_suppliers::{RepositoryError, Supplier, SupplierRepository};

use crate::db::{UNIQUE_VIOLATION, sqlstate};

#[derive(Debug, Clone)]
pub struct PostgresSupplierRepository {
    pool: PgPool,
}

impl PostgresSupplierRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn supplier_from_row(row: &PgRow) -> Result<Supplier, RepositoryError> {
    let decode = |e: sqlx::Error| RepositoryError::Corrupt(e.to_string());
    Ok(Supplier {
        id: SupplierId::from_uuid(row.try_get("id").map_err(decode)?),
        name: row.try_get("name").map_err(decode)?,
        document: row.try_get("document").map_err(decode)?,
        active: row.try_get("active").map_err(decode)?,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    if sqlstate(&err).as_deref() == Some(UNIQUE_VIOLATION) {
        return RepositoryError::Conflict(format!("{operation}: {err}"));
    }
    match err {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            RepositoryError::Corrupt(format!("{operation}: {err}"))
        }
        _ => RepositoryError::Unavailable(format!("sqlx error in {operation}: {err}")),
    }
}

#[async_trait]
impl SupplierRepository for PostgresSupplierRepository {
    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Supplier>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name, document, active FROM suppliers ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_suppliers", e))?;

        rows.iter().map(supplier_from_row).collect()
    }

    #[instrument(skip(self), fields(supplier_id = %id), err)]
    async fn get(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, document, active FROM suppliers WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_supplier", e))?;

        row.as_ref().map(supplier_from_row).transpose()
    }

    #[instrument(skip(self, supplier), fields(supplier_id = %supplier.id), err)]
    async fn insert(&self, supplier: &Supplier) -> Result<RowsAffected, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, document, active)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(supplier.id.as_uuid())
        .bind(&supplier.name)
        .bind(&supplier.document)
        .bind(supplier.active)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_supplier", e))?;

        Ok(result.rows_affected().into())
    }

    #[instrument(skip(self, supplier), fields(supplier_id = %id), err)]
    async fn replace_by_id(
        &self,
        id: SupplierId,
        supplier: &Supplier,
    ) -> Result<RowsAffected, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET name = $2, document = $3, active = $4
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(&supplier.name)
        .bind(&supplier.document)
        .bind(supplier.active)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("replace_supplier", e))?;

        Ok(result.rows_affected().into())
    }

    #[instrument(skip(self), fields(supplier_id = %id), err)]
    async fn delete_by_id(&self, id: SupplierId) -> Result<RowsAffected, RepositoryError> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_supplier", e))?;

        Ok(result.rows_affected().into())
    }
}
