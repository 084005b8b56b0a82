//! The `ConfigurationKey` Store contract consumed by the resolver and
//! manager (§6, §9 "Persistent bag as external collaborator").
//!
//! Any backend — in-memory map, file, database — can sit behind this
//! trait without the manager knowing the difference. The `device-model`
//! crate ships an in-memory backend and a SQLite backend (§4.9).

use crate::errors::StoreError;

/// A single persisted configuration key/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationKeyEntry {
    pub key: String,
    pub value: String,
    pub readonly: bool,
    pub visible: bool,
    pub reboot: bool,
}

/// Metadata attached when a key is first materialized.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigurationKeyOpts {
    pub readonly: bool,
    pub visible: bool,
    pub reboot: bool,
}

/// Key/value bag the station owns. Lookups are case-insensitive; the
/// casing a key was first stored under is preserved on read.
pub trait ConfigurationKeyStore {
    /// Looks up `key_name` case-insensitively.
    fn get(&self, key_name: &str) -> Result<Option<ConfigurationKeyEntry>, StoreError>;

    /// Inserts `key_name` with `value` and `opts`. When `overwrite` is
    /// `false` and the key already exists, this is a no-op (used by the
    /// self-check's non-overwriting materialization, §4.5.3).
    fn add(
        &self,
        key_name: &str,
        value: &str,
        opts: ConfigurationKeyOpts,
        overwrite: bool,
    ) -> Result<(), StoreError>;

    /// Updates the value of an existing key, preserving its other fields.
    /// Implementations may create the key if absent, mirroring a plain
    /// upsert (§4.5.2 step 5).
    fn set_value(&self, key_name: &str, value: &str) -> Result<(), StoreError>;

    /// All entries currently visible (`visible != false`), for the
    /// ConfigurationInventory report (§4.6).
    fn visible_entries(&self) -> Result<Vec<ConfigurationKeyEntry>, StoreError>;
}
