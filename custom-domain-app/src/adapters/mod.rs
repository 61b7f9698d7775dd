//! Storage adapters for `DomainConfigRepository`.

mod memory;

pub use memory::InMemoryDomainConfigRepository;

#[cfg(feature = "sqlite-store")]
mod sqlite;

#[cfg(feature = "sqlite-store")]
pub use sqlite::SqliteStore;
