//! Variable Registry (C1): the static catalog of supported
//! `(Component, Variable[, instance])` tuples and their metadata.
//!
//! The registry is the sole authority on whether a `(component, variable)`
//! pair is part of the protocol surface the station claims to implement
//! (§4.1). It is built once, lazily, into an index that supports both an
//! exact `(component, variable, instance)` lookup and the instance-agnostic
//! fallback.

mod catalog;

use std::collections::HashMap;
use std::sync::OnceLock;

pub use device_model_types::VariableMetadata;
use device_model_types::ComponentName;

type Key = (ComponentName, String, Option<String>);

/// Immutable, process-wide index over [`catalog::entries`].
pub struct Registry {
    by_exact_key: HashMap<Key, &'static VariableMetadata>,
}

fn global() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::build)
}

impl Registry {
    fn build() -> Self {
        let mut by_exact_key = HashMap::new();
        for entry in catalog::entries() {
            let key = (
                entry.component,
                entry.variable.to_lowercase(),
                entry.instance.map(|i| i.to_lowercase()),
            );
            if by_exact_key.insert(key, entry).is_some() {
                panic!("duplicate registry entry for {:?}/{}", entry.component, entry.variable);
            }
        }
        Self { by_exact_key }
    }

    /// Process-wide registry instance. The catalog is immutable after boot
    /// (§3), so a single shared instance is sufficient and avoids rebuilding
    /// the index on every lookup.
    pub fn shared() -> &'static Registry {
        global()
    }

    /// Looks up metadata for `(component, variable, instance)`. When an
    /// exact match including `instance` is not found, falls back to the
    /// instance-agnostic entry (§4.1).
    pub fn lookup(
        &self,
        component: ComponentName,
        variable: &str,
        instance: Option<&str>,
    ) -> Option<&'static VariableMetadata> {
        let variable_lc = variable.to_lowercase();
        if let Some(instance) = instance {
            let exact = (component, variable_lc.clone(), Some(instance.to_lowercase()));
            if let Some(m) = self.by_exact_key.get(&exact) {
                return Some(m);
            }
        }
        let fallback = (component, variable_lc, None);
        self.by_exact_key.get(&fallback).copied()
    }

    /// Whether `component` is part of the supported component set at all
    /// (distinct from whether a specific variable under it exists).
    pub fn supports_component(&self, component: ComponentName) -> bool {
        self.by_exact_key.keys().any(|(c, _, _)| *c == component)
    }

    /// All catalog entries, in declaration order of [`catalog::entries`].
    /// Used by the Base Report Builder (C6) and the startup self-check.
    pub fn all(&self) -> impl Iterator<Item = &'static VariableMetadata> {
        catalog::entries().iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_variable_resolves() {
        let m = Registry::shared()
            .lookup(ComponentName::OCPPCommCtrlr, "HeartbeatInterval", None)
            .expect("HeartbeatInterval must be registered");
        assert_eq!(m.variable, "HeartbeatInterval");
    }

    #[test]
    fn case_insensitive_lookup() {
        let a = Registry::shared().lookup(ComponentName::AuthCtrlr, "authorizeremotestart", None);
        let b = Registry::shared().lookup(ComponentName::AuthCtrlr, "AuthorizeRemoteStart", None);
        assert!(a.is_some());
        assert_eq!(a.map(|m| m.variable), b.map(|m| m.variable));
    }

    #[test]
    fn unknown_variable_is_none() {
        assert!(Registry::shared()
            .lookup(ComponentName::AuthCtrlr, "DoesNotExist", None)
            .is_none());
    }

    #[test]
    fn instance_falls_back_to_instance_agnostic_entry() {
        let m = Registry::shared().lookup(ComponentName::EVSE, "AvailabilityState", Some("1"));
        assert!(m.is_some());
    }
}
