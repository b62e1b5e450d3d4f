//! Suppliers domain module (fornecedores).
//!
//! This crate holds the supplier record, its field rules, the repository
//! contract and the create/read/update/delete flow. No IO lives here; storage
//! is reached only through [`SupplierRepository`].

pub mod repository;
pub mod service;
pub mod supplier;

pub use repository::{RepositoryError, SupplierRepository};
pub use service::{SupplierError, SupplierService};
pub use supplier::{DOCUMENT_REGEX, NAME_MAX_LEN, Supplier, SupplierDraft};
