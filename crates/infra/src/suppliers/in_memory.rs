use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use supplydesk_core::{RowsAffected, SupplierId};
use supplydesk_suppliers::{RepositoryError, Supplier, SupplierRepository};

/// In-memory supplier table for tests/dev.
///
/// Rows are keyed by id; UUIDv7 ids make `list` come back in creation order.
#[derive(Debug, Default)]
pub struct InMemorySupplierRepository {
    rows: RwLock<BTreeMap<SupplierId, Supplier>>,
}

impl InMemorySupplierRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("supplier table lock poisoned".into())
}

#[async_trait]
impl SupplierRepository for InMemorySupplierRepository {
    async fn list(&self) -> Result<Vec<Supplier>, RepositoryError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.values().cloned().collect())
    }

    async fn get(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.get(&id).cloned())
    }

    async fn insert(&self, supplier: &Supplier) -> Result<RowsAffected, RepositoryError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        if rows.contains_key(&supplier.id) {
            return Err(RepositoryError::Conflict(format!(
                "supplier {} already exists",
                supplier.id
            )));
        }
        rows.insert(supplier.id, supplier.clone());
        Ok(RowsAffected::ONE)
    }

    async fn replace_by_id(
        &self,
        id: SupplierId,
        supplier: &Supplier,
    ) -> Result<RowsAffected, RepositoryError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        let Some(row) = rows.get_mut(&id) else {
            return Ok(RowsAffected::NONE);
        };
        *row = Supplier {
            id,
            ..supplier.clone()
        };
        Ok(RowsAffected::ONE)
    }

    async fn delete_by_id(&self, id: SupplierId) -> Result<RowsAffected, RepositoryError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        Ok(rows.remove(&id).is_some().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier(name: &str) -> Supplier {
        Supplier {
            id: SupplierId::new(),
            name: name.into(),
            document: "12345678901".into(),
            active: true,
        }
    }

    #[tokio::test]
    async fn list_returns_rows_in_creation_order() {
        let repo = InMemorySupplierRepository::new();
        let a = supplier("A");
        let b = supplier("B");
        repo.insert(&a).await.unwrap();
        repo.insert(&b).await.unwrap();

        let names: Vec<_> = repo.list().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_conflict() {
        let repo = InMemorySupplierRepository::new();
        let a = supplier("A");
        repo.insert(&a).await.unwrap();
        assert!(matches!(repo.insert(&a).await, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn replace_keeps_path_id() {
        let repo = InMemorySupplierRepository::new();
        let a = supplier("A");
        repo.insert(&a).await.unwrap();

        let other = supplier("Z");
        assert_eq!(repo.replace_by_id(a.id, &other).await.unwrap(), RowsAffected::ONE);

        let stored = repo.get(a.id).await.unwrap().unwrap();
        assert_eq!(stored.id, a.id);
        assert_eq!(stored.name, "Z");
        assert!(repo.get(other.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_rows_report_zero_affected() {
        let repo = InMemorySupplierRepository::new();
        let ghost = supplier("ghost");
        assert!(repo.replace_by_id(ghost.id, &ghost).await.unwrap().is_zero());
        assert!(repo.delete_by_id(ghost.id).await.unwrap().is_zero());
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let repo = InMemorySupplierRepository::new();
        let a = supplier("A");
        repo.insert(&a).await.unwrap();
        assert_eq!(repo.delete_by_id(a.id).await.unwrap(), RowsAffected::ONE);
        assert!(repo.list().await.unwrap().is_empty());
    }
}
