//! In-memory `ConfigurationKeyStore` backend. The default; used by every
//! test in this crate and by `[store] backend = "memory"` deployments.

use std::collections::HashMap;
use std::sync::RwLock;

use device_model_types::{ConfigurationKeyEntry, ConfigurationKeyOpts, ConfigurationKeyStore, StoreError};

/// Case-insensitive key/value bag guarded by a single `RwLock`. Reads the
/// key's original casing back unchanged, matching the SQLite backend's
/// `COLLATE NOCASE` behavior.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, ConfigurationKeyEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigurationKeyStore for MemoryStore {
    fn get(&self, key_name: &str) -> Result<Option<ConfigurationKeyEntry>, StoreError> {
        let lc = key_name.to_lowercase();
        let entries = self.entries.read().expect("configuration key store lock poisoned");
        Ok(entries.get(&lc).cloned())
    }

    fn add(
        &self,
        key_name: &str,
        value: &str,
        opts: ConfigurationKeyOpts,
        overwrite: bool,
    ) -> Result<(), StoreError> {
        let lc = key_name.to_lowercase();
        let mut entries = self.entries.write().expect("configuration key store lock poisoned");
        if !overwrite && entries.contains_key(&lc) {
            return Ok(());
        }
        entries.insert(
            lc,
            ConfigurationKeyEntry {
                key: key_name.to_string(),
                value: value.to_string(),
                readonly: opts.readonly,
                visible: opts.visible,
                reboot: opts.reboot,
            },
        );
        Ok(())
    }

    fn set_value(&self, key_name: &str, value: &str) -> Result<(), StoreError> {
        let lc = key_name.to_lowercase();
        let mut entries = self.entries.write().expect("configuration key store lock poisoned");
        entries
            .entry(lc)
            .and_modify(|e| e.value = value.to_string())
            .or_insert_with(|| ConfigurationKeyEntry {
                key: key_name.to_string(),
                value: value.to_string(),
                readonly: false,
                visible: true,
                reboot: false,
            });
        Ok(())
    }

    fn visible_entries(&self) -> Result<Vec<ConfigurationKeyEntry>, StoreError> {
        let entries = self.entries.read().expect("configuration key store lock poisoned");
        Ok(entries.values().filter(|e| e.visible).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_get_is_case_insensitive() {
        let store = MemoryStore::new();
        store.add("HeartbeatInterval", "60", ConfigurationKeyOpts::default(), true).unwrap();
        let got = store.get("heartbeatinterval").unwrap().expect("must exist");
        assert_eq!(got.value, "60");
        assert_eq!(got.key, "HeartbeatInterval");
    }

    #[test]
    fn add_without_overwrite_is_a_no_op_when_present() {
        let store = MemoryStore::new();
        store.add("k", "1", ConfigurationKeyOpts::default(), true).unwrap();
        store.add("k", "2", ConfigurationKeyOpts::default(), false).unwrap();
        assert_eq!(store.get("k").unwrap().unwrap().value, "1");
    }

    #[test]
    fn set_value_preserves_other_fields() {
        let store = MemoryStore::new();
        let opts = ConfigurationKeyOpts { readonly: true, visible: false, reboot: true };
        store.add("k", "1", opts, true).unwrap();
        store.set_value("k", "2").unwrap();
        let got = store.get("k").unwrap().unwrap();
        assert_eq!(got.value, "2");
        assert!(got.readonly);
        assert!(!got.visible);
        assert!(got.reboot);
    }

    #[test]
    fn visible_entries_excludes_hidden_keys() {
        let store = MemoryStore::new();
        store.add("shown", "1", ConfigurationKeyOpts { visible: true, ..Default::default() }, true).unwrap();
        store.add("hidden", "1", ConfigurationKeyOpts { visible: false, ..Default::default() }, true).unwrap();
        let visible = store.visible_entries().unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].key, "shown");
    }
}
