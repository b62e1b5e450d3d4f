use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use supplydesk_core::{RowsAffected, SupplierId};

use crate::Supplier;

/// Storage failure (never a business outcome).
///
/// "Nothing was written" is reported as [`RowsAffected::NONE`], not as an
/// error, so callers can tell it apart from a broken store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("conflicting write: {0}")]
    Conflict(String),

    #[error("stored row could not be decoded: {0}")]
    Corrupt(String),
}

/// Supplier table access.
///
/// Implementations live in `supplydesk-infra` (in-memory and Postgres).
#[async_trait]
pub trait SupplierRepository: Send + Sync {
    /// Every stored supplier (no paging, no filtering).
    async fn list(&self) -> Result<Vec<Supplier>, RepositoryError>;

    async fn get(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError>;

    async fn insert(&self, supplier: &Supplier) -> Result<RowsAffected, RepositoryError>;

    /// Overwrite every column of row `id` with `supplier` (its own `id` is ignored).
    async fn replace_by_id(
        &self,
        id: SupplierId,
        supplier: &Supplier,
    ) -> Result<RowsAffected, RepositoryError>;

    async fn delete_by_id(&self, id: SupplierId) -> Result<RowsAffected, RepositoryError>;
}

#[async_trait]
impl<R> SupplierRepository for Arc<R>
where
    R: SupplierRepository + ?Sized,
{
    async fn list(&self) -> Result<Vec<Supplier>, RepositoryError> {
        (**self).list().await
    }

    async fn get(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        (**self).get(id).await
    }

    async fn insert(&self, supplier: &Supplier) -> Result<RowsAffected, RepositoryError> {
        (**self).insert(supplier).await
    }

    async fn replace_by_id(
        &self,
        id: SupplierId,
        supplier: &Supplier,
    ) -> Result<RowsAffected, RepositoryError> {
        (**self).replace_by_id(id, supplier).await
    }

    async fn delete_by_id(&self, id: SupplierId) -> Result<RowsAffected, RepositoryError> {
        (**self).delete_by_id(id).await
    }
}
