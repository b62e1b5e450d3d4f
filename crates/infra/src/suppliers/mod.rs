//! Supplier table adapters.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemorySupplierRepository;
pub use postgres::PostgresSupplierRepository;
