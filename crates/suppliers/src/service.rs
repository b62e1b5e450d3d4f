//! Supplier use cases: validate, touch the store once, report the outcome.
//!
//! Every mutating operation follows the same contract:
//! 1. locate the record (update/delete only) -> [`DomainError::NotFound`]
//! 2. run the field rules -> [`DomainError::Validation`], store untouched
//! 3. write -> [`DomainError::NotPersisted`] when zero rows were affected

use thiserror::Error;
use tracing::{debug, instrument};

use supplydesk_core::{DomainError, SupplierId, check};

use crate::{RepositoryError, Supplier, SupplierDraft, SupplierRepository};

#[derive(Debug, Error)]
pub enum SupplierError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct SupplierService<R> {
    repo: R,
}

impl<R: SupplierRepository> SupplierService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Supplier>, SupplierError> {
        Ok(self.repo.list().await?)
    }

    pub async fn get(&self, id: SupplierId) -> Result<Supplier, SupplierError> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found::<Supplier>().into())
    }

    /// Create a supplier under a freshly generated id.
    #[instrument(skip(self, draft), err)]
    pub async fn create(&self, draft: SupplierDraft) -> Result<Supplier, SupplierError> {
        let supplier = draft.into_supplier(SupplierId::new());
        check(&supplier).map_err(DomainError::from)?;

        let written = self.repo.insert(&supplier).await?;
        if written.is_zero() {
            return Err(DomainError::NotPersisted.into());
        }

        debug!(supplier_id = %supplier.id, "supplier created");
        Ok(supplier)
    }

    /// Replace the supplier stored under `id` with `draft`.
    ///
    /// The field rules run against the record currently stored, not against
    /// `draft`. Replacement data is therefore persisted unchecked.
    #[instrument(skip(self, draft), fields(supplier_id = %id), err)]
    pub async fn update(&self, id: SupplierId, draft: SupplierDraft) -> Result<(), SupplierError> {
        let stored = self.get(id).await?;
        check(&stored).map_err(DomainError::from)?;

        let replacement = draft.into_supplier(id);
        let written = self.repo.replace_by_id(id, &replacement).await?;
        if written.is_zero() {
            return Err(DomainError::NotPersisted.into());
        }

        debug!("supplier replaced");
        Ok(())
    }

    #[instrument(skip(self), fields(supplier_id = %id), err)]
    pub async fn delete(&self, id: SupplierId) -> Result<(), SupplierError> {
        let stored = self.get(id).await?;
        check(&stored).map_err(DomainError::from)?;

        let written = self.repo.delete_by_id(id).await?;
        if written.is_zero() {
            return Err(DomainError::NotPersisted.into());
        }

        debug!("supplier deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use supplydesk_core::RowsAffected;

    use super::*;

    /// Map-backed fake; `frozen` makes every write report zero rows.
    #[derive(Default)]
    struct FakeRepo {
        rows: Mutex<BTreeMap<SupplierId, Supplier>>,
        frozen: bool,
    }

    impl FakeRepo {
        fn frozen() -> Self {
            Self {
                frozen: true,
                ..Default::default()
            }
        }

        fn seed(&self, supplier: Supplier) {
            self.rows.lock().unwrap().insert(supplier.id, supplier);
        }

        fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SupplierRepository for FakeRepo {
        async fn list(&self) -> Result<Vec<Supplier>, RepositoryError> {
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn get(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn insert(&self, supplier: &Supplier) -> Result<RowsAffected, RepositoryError> {
            if self.frozen {
                return Ok(RowsAffected::NONE);
            }
            self.seed(supplier.clone());
            Ok(RowsAffected::ONE)
        }

        async fn replace_by_id(
            &self,
            id: SupplierId,
            supplier: &Supplier,
        ) -> Result<RowsAffected, RepositoryError> {
            if self.frozen {
                return Ok(RowsAffected::NONE);
            }
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&id) {
                Some(row) => {
                    *row = Supplier { id, ..supplier.clone() };
                    Ok(RowsAffected::ONE)
                }
                None => Ok(RowsAffected::NONE),
            }
        }

        async fn delete_by_id(&self, id: SupplierId) -> Result<RowsAffected, RepositoryError> {
            if self.frozen {
                return Ok(RowsAffected::NONE);
            }
            Ok(self.rows.lock().unwrap().remove(&id).is_some().into())
        }
    }

    fn draft(name: &str, document: &str) -> SupplierDraft {
        SupplierDraft {
            name: name.to_string(),
            document: document.to_string(),
            active: true,
        }
    }

    fn assert_domain(err: SupplierError, expected: fn(&DomainError) -> bool) {
        match err {
            SupplierError::Domain(ref e) if expected(e) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_round_trips() {
        let service = SupplierService::new(FakeRepo::default());

        let created = service.create(draft("ACME", "12345678000190")).await.unwrap();
        assert!(!created.id.is_nil());

        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn invalid_create_persists_nothing() {
        let repo = FakeRepo::default();
        let service = SupplierService::new(repo);

        let err = service.create(draft("", "123")).await.unwrap_err();
        match err {
            SupplierError::Domain(DomainError::Validation(fields)) => {
                assert!(fields.contains("name"));
                assert!(fields.contains("document"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_rows_on_create_is_not_persisted() {
        let service = SupplierService::new(FakeRepo::frozen());
        let err = service.create(draft("ACME", "12345678901")).await.unwrap_err();
        assert_domain(err, |e| matches!(e, DomainError::NotPersisted));
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let service = SupplierService::new(FakeRepo::default());
        let err = service.get(SupplierId::new()).await.unwrap_err();
        assert_domain(err, |e| matches!(e, DomainError::NotFound("supplier")));
    }

    #[tokio::test]
    async fn update_unknown_is_not_found() {
        let service = SupplierService::new(FakeRepo::default());
        let err = service
            .update(SupplierId::new(), draft("ACME", "12345678901"))
            .await
            .unwrap_err();
        assert_domain(err, |e| matches!(e, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_replaces_whole_record_under_path_id() {
        let service = SupplierService::new(FakeRepo::default());
        let created = service.create(draft("ACME", "12345678901")).await.unwrap();

        let replacement = SupplierDraft {
            name: "ACME Holding".into(),
            document: "12345678000190".into(),
            active: false,
        };
        service.update(created.id, replacement).await.unwrap();

        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.name, "ACME Holding");
        assert_eq!(fetched.document, "12345678000190");
        assert!(!fetched.active);
    }

    #[tokio::test]
    async fn update_checks_the_stored_record_not_the_replacement() {
        let repo = FakeRepo::default();
        let stored = draft("ACME", "12345678901").into_supplier(SupplierId::new());
        repo.seed(stored.clone());
        let service = SupplierService::new(repo);

        // Invalid replacement over a valid stored record goes through.
        service.update(stored.id, draft("", "bad")).await.unwrap();
        assert_eq!(service.get(stored.id).await.unwrap().document, "bad");

        // The stored record is now invalid, so even a valid replacement is refused.
        let err = service
            .update(stored.id, draft("ACME", "12345678901"))
            .await
            .unwrap_err();
        assert_domain(err, |e| matches!(e, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn update_with_zero_rows_is_not_persisted() {
        let repo = FakeRepo::frozen();
        let stored = draft("ACME", "12345678901").into_supplier(SupplierId::new());
        repo.seed(stored.clone());

        let service = SupplierService::new(repo);
        let err = service
            .update(stored.id, draft("ACME SA", "12345678000190"))
            .await
            .unwrap_err();
        assert_domain(err, |e| matches!(e, DomainError::NotPersisted));
        assert_eq!(service.get(stored.id).await.unwrap(), stored);
    }

    #[tokio::test]
    async fn delete_of_invalid_stored_record_is_refused() {
        let repo = FakeRepo::default();
        let stored = draft("", "bad").into_supplier(SupplierId::new());
        repo.seed(stored.clone());

        let service = SupplierService::new(repo);
        let err = service.delete(stored.id).await.unwrap_err();
        assert_domain(err, |e| matches!(e, DomainError::Validation(_)));
        assert!(service.get(stored.id).await.is_ok());
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found_the_second_time() {
        let service = SupplierService::new(FakeRepo::default());
        let created = service.create(draft("ACME", "12345678901")).await.unwrap();

        service.delete(created.id).await.unwrap();
        let err = service.delete(created.id).await.unwrap_err();
        assert_domain(err, |e| matches!(e, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_with_zero_rows_is_not_persisted() {
        let repo = FakeRepo::frozen();
        let stored = draft("ACME", "12345678901").into_supplier(SupplierId::new());
        repo.seed(stored.clone());
        assert_eq!(repo.len(), 1);

        let service = SupplierService::new(repo);
        let err = service.delete(stored.id).await.unwrap_err();
        assert_domain(err, |e| matches!(e, DomainError::NotPersisted));
    }
}
