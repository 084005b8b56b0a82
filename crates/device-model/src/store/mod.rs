//! `ConfigurationKeyStore` backends (C9, §4.9).
//!
//! Both backends implement the same [`device_model_types::ConfigurationKeyStore`]
//! trait; the manager and resolver never know which one is behind it.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
