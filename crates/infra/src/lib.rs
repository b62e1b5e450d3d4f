//! Infrastructure layer: configuration, Postgres pool and schema, store adapters.

pub mod config;
pub mod db;
pub mod suppliers;
pub mod users;

pub use config::{BootstrapAdmin, DatabaseSettings, Settings};
pub use suppliers::{InMemorySupplierRepository, PostgresSupplierRepository};
pub use users::{InMemoryUserStore, PostgresUserStore};
