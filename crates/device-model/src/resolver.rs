//! Value Resolver (C3, §4.3).
//!
//! Computes the current value of a registry entry, trying each source in
//! order and stopping at the first one that yields a non-empty string.
//! Does no I/O beyond the `ConfigurationKeyStore` trait — no network, no
//! filesystem — so it is safe to call from the manager's synchronous,
//! single-threaded request path (§5).

use device_model_types::{ConfigurationKeyOpts, ConfigurationKeyStore, StationContext, VariableMetadata, DEFAULT_TX_UPDATED_INTERVAL, HEARTBEAT_INTERVAL_VAR, TX_UPDATED_INTERVAL_VAR, WEBSOCKET_PING_INTERVAL_VAR};

use crate::key::build_store_key;
use crate::manager::RuntimeOverrides;

/// Resolves `metadata`'s current value, materializing its default into
/// `store` on first read when applicable (§4.3 step 2).
pub fn resolve(
    metadata: &VariableMetadata,
    variable: &device_model_types::Variable,
    station: &dyn StationContext,
    store: &dyn ConfigurationKeyStore,
    overrides: &RuntimeOverrides,
) -> String {
    if let Some(hook) = metadata.resolve {
        if let Some(v) = hook(station).filter(|v| !v.is_empty()) {
            return apply_post_process(metadata, station, v);
        }
    }

    let store_key = build_store_key(metadata, variable);

    if metadata.persistence == device_model_types::Persistence::Persistent {
        if let Some(v) = persistent_value(metadata, &store_key, store) {
            if !v.is_empty() {
                return apply_post_process(metadata, station, v);
            }
        }
    }

    if metadata.persistence == device_model_types::Persistence::Volatile {
        if let Some(v) = overrides.get(&store_key) {
            if !v.is_empty() {
                return apply_post_process(metadata, station, v);
            }
        }
    }

    if let Some(v) = well_known_fallback(metadata.variable, station) {
        if !v.is_empty() {
            return apply_post_process(metadata, station, v);
        }
    }

    apply_post_process(metadata, station, String::new())
}

fn persistent_value(metadata: &VariableMetadata, store_key: &str, store: &dyn ConfigurationKeyStore) -> Option<String> {
    match store.get(store_key) {
        Ok(Some(entry)) => Some(entry.value),
        Ok(None) => {
            if let (Some(default), false) = (metadata.default_value, metadata.is_component_instance_scoped()) {
                let _ = store.add(store_key, default, ConfigurationKeyOpts { visible: true, ..Default::default() }, false);
                return store.get(store_key).ok().flatten().map(|e| e.value);
            }
            None
        }
        Err(_) => None,
    }
}

fn well_known_fallback(variable: &str, station: &dyn StationContext) -> Option<String> {
    if variable.eq_ignore_ascii_case(HEARTBEAT_INTERVAL_VAR) {
        Some(station.heartbeat_interval().to_string())
    } else if variable.eq_ignore_ascii_case(WEBSOCKET_PING_INTERVAL_VAR) {
        Some(station.ws_ping_interval().to_string())
    } else if variable.eq_ignore_ascii_case(TX_UPDATED_INTERVAL_VAR) {
        Some(DEFAULT_TX_UPDATED_INTERVAL.to_string())
    } else {
        None
    }
}

fn apply_post_process(metadata: &VariableMetadata, station: &dyn StationContext, value: String) -> String {
    match metadata.post_process {
        Some(hook) => hook(station, &value),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_support::FakeStation;
    use device_model_types::{ComponentName, DataType, Mutability, Persistence, Variable};

    fn meta(persistence: Persistence, default_value: Option<&'static str>) -> VariableMetadata {
        VariableMetadata {
            component: ComponentName::AuthCtrlr,
            variable: "AuthorizeRemoteStart",
            instance: None,
            data_type: DataType::Boolean,
            mutability: Mutability::ReadWrite,
            persistence,
            supported_attributes: &[device_model_types::AttributeKind::Actual],
            supports_monitoring: false,
            default_value,
            min: None,
            max: None,
            enum_values: None,
            pattern: None,
            resolve: None,
            post_process: None,
            reboot_required: false,
            supports_target: false,
            flatten_instance: false,
        }
    }

    #[test]
    fn persistent_default_is_materialized_on_first_read() {
        let store = MemoryStore::new();
        let overrides = RuntimeOverrides::new();
        let station = FakeStation::default();
        let m = meta(Persistence::Persistent, Some("false"));
        let v = Variable::new("AuthorizeRemoteStart");
        let value = resolve(&m, &v, &station, &store, &overrides);
        assert_eq!(value, "false");
        assert_eq!(store.get("AuthorizeRemoteStart").unwrap().unwrap().value, "false");
    }

    #[test]
    fn volatile_falls_back_to_runtime_override() {
        let store = MemoryStore::new();
        let overrides = RuntimeOverrides::new();
        overrides.set("AuthorizeRemoteStart", "true");
        let station = FakeStation::default();
        let m = meta(Persistence::Volatile, None);
        let v = Variable::new("AuthorizeRemoteStart");
        assert_eq!(resolve(&m, &v, &station, &store, &overrides), "true");
    }

    #[test]
    fn well_known_heartbeat_fallback() {
        let store = MemoryStore::new();
        let overrides = RuntimeOverrides::new();
        let station = FakeStation { heartbeat_interval: 45, ..Default::default() };
        let mut m = meta(Persistence::Volatile, None);
        m.component = ComponentName::OCPPCommCtrlr;
        m.variable = "HeartbeatInterval";
        let v = Variable::new("HeartbeatInterval");
        assert_eq!(resolve(&m, &v, &station, &store, &overrides), "45");
    }
}
